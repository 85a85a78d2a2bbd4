//! Static vocabulary tables for the heuristic extractors.
//!
//! Scope: Cloud, Data and AI certifications only. These are data-driven
//! rule tables — the matching logic lives in `signals.rs` and
//! `normalizer.rs`, keeping the tables easy to extend and test.

use once_cell::sync::Lazy;
use regex::Regex;

// ────────────────────────────────────────────────────────────────────────────
// Technology keywords (fallback skill extraction)
// ────────────────────────────────────────────────────────────────────────────

/// Tech skills scanned by the keyword fallback when LLM extraction yields
/// nothing. Cloud, Data and AI domains only.
pub const TECH_SKILLS: &[&str] = &[
    // Programming for Data/AI
    "python",
    "r",
    "scala",
    "java",
    "sql",
    // Cloud platforms
    "aws",
    "azure",
    "gcp",
    "google cloud",
    "cloud",
    "ec2",
    "s3",
    "lambda",
    "cloud computing",
    "iaas",
    "paas",
    "saas",
    "serverless",
    // Cloud services
    "vpc",
    "iam",
    "cloudformation",
    "arm templates",
    "cloud functions",
    // Data engineering
    "nosql",
    "mongodb",
    "postgresql",
    "mysql",
    "bigquery",
    "snowflake",
    "databricks",
    "spark",
    "hadoop",
    "kafka",
    "airflow",
    "etl",
    "data warehouse",
    "data lake",
    "data pipeline",
    "data modeling",
    // Analytics & BI
    "analytics",
    "bi",
    "power bi",
    "tableau",
    "looker",
    "data studio",
    "data analysis",
    "data visualization",
    "reporting",
    // AI/ML
    "machine learning",
    "deep learning",
    "tensorflow",
    "pytorch",
    "keras",
    "nlp",
    "computer vision",
    "neural network",
    "ai",
    "artificial intelligence",
    "scikit-learn",
    "pandas",
    "numpy",
    "jupyter",
    // MLOps
    "mlops",
    "sagemaker",
    "azure ml",
    "vertex ai",
    "kubeflow",
    // Big data
    "big data",
    "hdfs",
    "hive",
    "presto",
    "redshift",
    "synapse",
];

/// Generic single words skipped by the keyword fallback — too ambiguous on
/// their own ("data scientist" matches via longer entries instead).
pub const FALLBACK_SKIP_TERMS: &[&str] = &["cloud", "data", "ai", "r", "c"];

/// Generic terms filtered out of LLM-extracted skill lists.
pub const GENERIC_SKILL_TERMS: &[&str] = &[
    "cloud",
    "data",
    "ai",
    "ia",
    "ml",
    "none",
    "n/a",
    "certification",
    "certifications",
];

/// Known skill names used to salvage something from an LLM response that
/// came back as prose instead of a list.
pub const SALVAGE_SKILLS: &[&str] = &[
    "AWS",
    "Azure",
    "GCP",
    "Python",
    "SQL",
    "Spark",
    "Hadoop",
    "TensorFlow",
    "PyTorch",
    "Keras",
    "Scikit-learn",
    "Pandas",
    "Docker",
    "Kubernetes",
    "Airflow",
    "Kafka",
    "BigQuery",
    "Redshift",
    "Snowflake",
    "Power BI",
    "Tableau",
    "R",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "MLOps",
];

// ────────────────────────────────────────────────────────────────────────────
// Domain detection tables
// ────────────────────────────────────────────────────────────────────────────

pub const DOMAINS: &[&str] = &["cloud", "data", "ai"];

/// Short tokens that need word-boundary matching to avoid false positives
/// ("ai" inside "maintain", "bi" inside "bien", ...).
pub const SHORT_KEYWORDS: &[&str] = &["ai", "ia", "ml", "bi", "r"];

/// Per-domain keyword lists; each occurrence is worth one point.
pub const DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "cloud",
        &[
            "cloud",
            "aws",
            "azure",
            "gcp",
            "google cloud",
            "amazon web services",
            "cloud computing",
            "iaas",
            "paas",
            "saas",
            "serverless",
            "ec2",
            "s3",
            "lambda",
            "cloud engineer",
            "cloud architect",
            "solutions architect",
        ],
    ),
    (
        "data",
        &[
            "data",
            "sql",
            "database",
            "analytics",
            "bi",
            "power bi",
            "tableau",
            "etl",
            "warehouse",
            "bigquery",
            "spark",
            "hadoop",
            "data engineer",
            "data analyst",
            "data science",
            "big data",
            "data pipeline",
            "databricks",
        ],
    ),
    (
        "ai",
        &[
            "ai",
            "machine learning",
            "ml",
            "deep learning",
            "nlp",
            "neural",
            "tensorflow",
            "pytorch",
            "computer vision",
            "artificial intelligence",
            "data scientist",
            "ml engineer",
            "ia",
            "intelligence artificielle",
        ],
    ),
];

/// Phrase-level patterns worth five points each — a "cloud engineer"
/// mention says more about intent than five scattered keyword hits.
pub static STRONG_DOMAIN_PATTERNS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("invalid domain pattern"))
            .collect::<Vec<_>>()
    };
    vec![
        (
            "cloud",
            compile(&[
                r"cloud\s+computing",
                r"cloud\s+engineer",
                r"aws",
                r"azure",
                r"carriere.*cloud",
                r"debuter.*cloud",
            ]),
        ),
        (
            "data",
            compile(&[
                r"data\s+engineer",
                r"data\s+scientist",
                r"data\s+analyst",
                r"big\s+data",
                r"carriere.*data",
            ]),
        ),
        (
            "ai",
            compile(&[
                r"machine\s+learning",
                r"deep\s+learning",
                r"intelligence\s+artificielle",
                r"carriere.*ia",
                r"carriere.*ai",
            ]),
        ),
    ]
});

// ────────────────────────────────────────────────────────────────────────────
// Held-certification catalog
// ────────────────────────────────────────────────────────────────────────────

/// (lowercase mention, certification id) pairs used to detect credentials
/// the user already holds.
pub const KNOWN_CERTIFICATIONS: &[(&str, &str)] = &[
    // AWS
    ("aws solutions architect associate", "aws-solutions-architect-associate"),
    ("aws solutions architect professional", "aws-solutions-architect-pro"),
    ("aws certified solutions architect", "aws-solutions-architect-associate"),
    ("aws certified cloud practitioner", "aws-cloud-practitioner"),
    ("aws cloud practitioner", "aws-cloud-practitioner"),
    ("aws sysops", "aws-sysops-associate"),
    ("aws developer associate", "aws-developer-associate"),
    ("aws data analytics", "aws-data-analytics"),
    ("aws machine learning specialty", "aws-ml-specialty"),
    // Azure
    ("azure fundamentals", "azure-fundamentals"),
    ("azure administrator", "azure-administrator"),
    ("azure solutions architect", "azure-solutions-architect"),
    ("azure data scientist", "azure-data-scientist"),
    ("azure developer", "azure-developer"),
    ("az-900", "azure-fundamentals"),
    ("az-104", "azure-administrator"),
    ("az-305", "azure-solutions-architect"),
    ("dp-100", "azure-data-scientist"),
    ("az-204", "azure-developer"),
    ("pl-300", "power-bi-analyst"),
    // GCP
    ("google cloud associate", "gcp-cloud-engineer"),
    ("google cloud professional", "gcp-professional-cloud-architect"),
    ("gcp professional data engineer", "gcp-data-engineer"),
    ("gcp machine learning engineer", "gcp-ml-engineer"),
    ("google professional data engineer", "gcp-data-engineer"),
    // Databricks
    ("databricks certified", "databricks-data-engineer"),
    ("databricks associate", "databricks-data-engineer"),
    ("databricks data engineer", "databricks-data-engineer-pro"),
    // Kubernetes
    ("cka", "cka-kubernetes"),
    ("ckad", "ckad-kubernetes"),
    ("certified kubernetes administrator", "cka-kubernetes"),
    ("certified kubernetes application developer", "ckad-kubernetes"),
    // Others
    ("terraform associate", "terraform-associate"),
    ("power bi", "power-bi-analyst"),
    ("tableau certified", "tableau-data-analyst"),
    ("snowflake", "snowflake-data-engineer"),
    ("tensorflow developer", "tensorflow-developer"),
    ("finops", "finops-practitioner"),
];

/// Cues that a certification mention means "already obtained" rather than
/// "interested in". Checked inside a ±200-character window.
pub static HELD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"certifi[ée]",
        r"obtenu",
        r"diplôm[ée]",
        r"certified",
        r"certification[s]?\s*(?:actuelle|obtenue|:)",
        r"certifications?\s*:\s*\n",
        r"\(\d{4}\)", // year in parentheses like (2022)
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid held pattern"))
    .collect()
});

// ────────────────────────────────────────────────────────────────────────────
// Experience / level cues
// ────────────────────────────────────────────────────────────────────────────

/// Strong beginner/student phrases. Any hit short-circuits experience
/// detection to zero years.
pub const STRONG_BEGINNER_INDICATORS: &[&str] = &[
    "étudiant en",
    "étudiante en",
    "student in",
    "recherche de stage",
    "recherche stage",
    "cherche stage",
    "première expérience",
    "premier emploi",
    "jeune diplômé",
    "nouveau diplômé",
    "fresh graduate",
    "sans expérience",
    "pas d'expérience",
    "no experience",
    "débutant en",
    "débuter en",
    "je débute",
    "en dernière année",
    "dernière année de",
    "en formation",
    "currently studying",
    "stage de fin d'études",
    "internship",
];

/// Weak student cues — only decisive when no real-employment cue appears.
pub const WEAK_STUDENT_INDICATORS: &[&str] = &[
    "stage",
    "stagiaire",
    "intern",
    "licence",
    "master",
    "bachelor",
    "bts",
    "dut",
    "alternance",
    "apprenti",
];

pub static REAL_JOB_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\b(?:cdi|cdd)\b",
        r"\bcontrat\s+(?:permanent|indéterminé)",
        r"\bfull[\s-]?time\s+(?:position|role)",
        r"\bsenior\s+\w+",
        r"\b(?:5|6|7|8|9|\d{2})\s*ans?\s*d'exp[ée]rience",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid job pattern"))
    .collect()
});

/// Explicit "N years of experience" phrasings, French and English.
pub static EXPLICIT_YEARS_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\d+)\s*(?:ans?|years?)\s*(?:d'?exp[ée]rience|experience|of experience)",
        r"(?:exp[ée]rience|experience)\s*(?:de\s*)?(\d+)\s*(?:ans?|years?)",
        r"(\d+)\+?\s*(?:ans?|years?)\s+(?:en tant que|as a|comme)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid years pattern"))
    .collect()
});

/// Professional job titles whose surrounding text may carry a date range.
/// Certification names are deliberately absent.
pub static JOB_TITLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bingénieur\s+(?:data|cloud|logiciel)",
        r"\bdevelop(?:per|eur)\b",
        r"\bdata\s+(?:engineer|analyst|scientist)\b",
        r"\bcloud\s+engineer\b",
        r"\bconsultant\s+(?:senior|data|cloud)",
        r"\bchef\s+de\s+projet\b",
        r"\btech\s+lead\b",
        r"\bdevops\b",
        r"\bsre\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid title pattern"))
    .collect()
});

/// "YYYY – YYYY" or "YYYY – present" ranges.
pub static DATE_RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})\s*[-–]\s*((?:\d{4})|present|présent|aujourd'?hui?|actuel)")
        .expect("invalid date range pattern")
});

/// Education vocabulary excluding a window from date-range parsing.
pub const EDUCATION_TERMS: &[&str] = &["formation", "études", "diplôme", "université", "école"];

/// Beginner keywords that force the level hint to débutant.
pub const BEGINNER_KEYWORDS: &[&str] = &[
    "étudiant",
    "student",
    "stagiaire",
    "stage",
    "intern",
    "débutant",
    "beginner",
    "entry level",
    "junior",
    "apprendre",
    "découvrir",
    "première expérience",
    "jeune diplômé",
    "nouveau dans",
    "reconversion",
    "cherche stage",
    "recherche stage",
    "en formation",
    "dernière année",
    "première certification",
    "débuter",
];

/// Explicit senior job-title patterns. "architect" alone is not here on
/// purpose — it is usually a certification name ("Solutions Architect").
pub static SENIOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bsenior\s+(?:engineer|developer|data|cloud)",
        r"\blead\s+(?:engineer|developer|data|architect)",
        r"\bprincipal\s+(?:engineer|architect)",
        r"\bchef\s+de\s+projet",
        r"\btech\s+lead\b",
        r"\b(?:10|15|20)\s*ans?\s*d'exp[ée]rience",
        r"\bexpert\s+(?:en|cloud|data|aws|azure)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid senior pattern"))
    .collect()
});
