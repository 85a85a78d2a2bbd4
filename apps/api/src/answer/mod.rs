//! Answer generation — turns a recommendation result into a conversational
//! French answer, with the structured evidence pinned into the prompt so
//! the model cannot invent certifications.

use tracing::debug;

use crate::llm_client::TextGenerator;
use crate::models::certification::Candidate;
use crate::reco::pipeline::RecommendationResult;
use crate::reco::reasoning::Reasoning;

const ANSWER_TEMPERATURE: f32 = 0.3;
const ANSWER_MAX_TOKENS: u32 = 1000;

/// Short messages carrying no recommendation intent. Matched by
/// containment after punctuation stripping, capped at 8 words.
const SOCIAL_MESSAGES: &[&str] = &[
    "merci",
    "merci beaucoup",
    "thank",
    "thanks",
    "thx",
    "ok",
    "okay",
    "d'accord",
    "compris",
    "entendu",
    "noté",
    "cool",
    "super",
    "parfait",
    "excellent",
    "génial",
    "top",
    "nickel",
    "impeccable",
    "bien",
    "très bien",
    "c'est bon",
    "c'est parfait",
    "formidable",
    "bravo",
    "salut",
    "hello",
    "bonjour",
    "bonsoir",
    "hi",
    "hey",
    "coucou",
    "bye",
    "au revoir",
    "à bientôt",
    "a bientot",
    "ciao",
    "bonne journée",
    "bonne soirée",
    "oui",
    "non",
    "peut-être",
    "je vois",
    "ah ok",
    "ah d'accord",
];

const SOCIAL_TEMPLATE: &str = r#"Tu es CertiBot, un assistant amical spécialisé en certifications Cloud, Data et IA.

Message de l'utilisateur: "{question}"

CONSIGNES:
- Réponds de manière naturelle, chaleureuse et courte (1-2 phrases max)
- Si c'est un remerciement ("merci", "parfait", etc.) → réponds poliment et propose ton aide
- Si c'est une salutation ("bonjour", "salut") → salue et demande comment tu peux aider
- Si c'est un au revoir ("bye", "au revoir") → souhaite une bonne journée
- Reste toujours positif et professionnel
- Tu peux utiliser des emojis avec modération

Exemples:
- "merci" → "Avec plaisir ! N'hésite pas si tu as d'autres questions sur les certifications."
- "bonjour" → "Bonjour ! Comment puis-je t'aider aujourd'hui avec les certifications ?"
- "parfait" → "Super ! Je suis là si tu as besoin d'autres recommandations."

Réponds maintenant:"#;

const PDF_WITH_GRAPH_TEMPLATE: &str = r#"Tu es un conseiller expert en certifications Cloud, Data et IA.

PROFIL CV ANALYSÉ:
- Compétences: {detected_skills}
- Domaines: {domains}
- Niveau recommandé: {level}
- Expérience: {experience_years} ans
- Certifications déjà obtenues: {held_certifications}

CERTIFICATIONS RECOMMANDÉES (classées par pertinence, choisis parmi les 3 premières):
{recommendations}

Question: {question}

RÈGLES OBLIGATOIRES:
1. Choisis 2-3 certifications UNIQUEMENT parmi les 5 premières de la liste ci-dessus
2. Les certifications sont déjà triées par pertinence (la #1 est la meilleure)
3. Le niveau demandé est "{level}" - privilégie ce niveau
4. NE recommande JAMAIS une certification déjà obtenue
5. Copie les informations EXACTEMENT comme dans la liste (nom, niveau, prix, durée)
6. Niveaux autorisés: Débutant, Intermédiaire, Avancé (JAMAIS "Expert")

Format obligatoire:
• [Nom exact de la certification] | Niveau: [X] | Prix: [X]€ | Durée: [X]

Réponds en français, max 100 mots."#;

const GRAPH_REASONING_TEMPLATE: &str = r#"Tu es un conseiller expert en certifications Cloud, Data et IA.

PROFIL UTILISATEUR:
- Compétences détectées: {detected_skills}
- Domaines: {domains}
- Niveau demandé: {level}
- Expérience: {experience_years} ans
- Certifications déjà obtenues: {held_certifications}

CERTIFICATIONS RECOMMANDÉES (triées par pertinence - #1 = meilleure):
{recommendations}

PREUVES STRUCTURÉES:
{evidence}

HISTORIQUE:
{history}

Question: {question}

RÈGLES OBLIGATOIRES:
1. Recommande 2-3 certifications parmi les 5 PREMIÈRES de la liste ci-dessus UNIQUEMENT
2. La liste est triée par score - préfère les certifications #1, #2, #3
3. Le niveau souhaité est "{level}" - choisis des certifications de ce niveau en priorité
4. NE recommande JAMAIS une certification déjà obtenue par l'utilisateur
5. Copie EXACTEMENT le nom, niveau, prix et durée tels qu'écrits dans la liste
6. NIVEAUX AUTORISÉS: "Débutant", "Intermédiaire", "Avancé" (PAS "Expert")

Format obligatoire pour chaque certification:
• [Nom exact] | Niveau: [Débutant/Intermédiaire/Avancé] | Prix: [X]€ | Durée: [X]

Réponds naturellement en français, max 100 mots."#;

const FALLBACK_TEMPLATE: &str = r#"Tu es un expert en certifications professionnelles.

Question: {question}

Réponds de manière utile. Si tu n'as pas d'information, dis-le."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Social,
    PdfWithGraph,
    GraphReasoning,
}

/// True for greetings, thanks and other chit-chat that should not trigger
/// the recommendation pipeline.
pub fn is_social_message(text: &str) -> bool {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '!' | '?' | '.' | ','))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.split_whitespace().count() > 8 {
        return false;
    }
    SOCIAL_MESSAGES.iter().any(|word| cleaned.contains(word))
}

/// Generates an answer grounded in the pipeline evidence. LLM failures are
/// folded into the answer text itself so the chat endpoint never errors on
/// a model outage.
pub async fn ask_with_evidence(
    llm: &dyn TextGenerator,
    question: &str,
    evidence: Option<&RecommendationResult>,
    history: &str,
    mode: AnswerMode,
) -> String {
    let prompt = build_prompt(question, evidence, history, mode);
    debug!("Answer generation in {mode:?} mode ({} chars)", prompt.len());

    match llm
        .complete(None, &prompt, ANSWER_TEMPERATURE, ANSWER_MAX_TOKENS)
        .await
    {
        Ok(answer) => answer,
        Err(e) => format!("Erreur lors de la génération de la réponse: {e}"),
    }
}

fn build_prompt(
    question: &str,
    evidence: Option<&RecommendationResult>,
    history: &str,
    mode: AnswerMode,
) -> String {
    let history = if history.is_empty() {
        "Pas d'historique"
    } else {
        history
    };

    match (mode, evidence) {
        (AnswerMode::Social, _) => SOCIAL_TEMPLATE.replace("{question}", question),
        (AnswerMode::PdfWithGraph, Some(result)) => {
            fill_evidence_template(PDF_WITH_GRAPH_TEMPLATE, question, result)
        }
        (AnswerMode::GraphReasoning, Some(result)) => {
            fill_evidence_template(GRAPH_REASONING_TEMPLATE, question, result)
                .replace("{evidence}", &format_evidence(&result.reasoning))
                .replace("{history}", history)
        }
        _ => FALLBACK_TEMPLATE.replace("{question}", question),
    }
}

fn fill_evidence_template(template: &str, question: &str, result: &RecommendationResult) -> String {
    let analysis = &result.skill_analysis;

    let detected_skills: Vec<&str> = analysis
        .skill_vector
        .keys()
        .take(10)
        .map(String::as_str)
        .collect();
    let detected_skills = if detected_skills.is_empty() {
        "Non détectées".to_string()
    } else {
        detected_skills.join(", ")
    };

    let domains = if analysis.domains.is_empty() {
        "Non spécifiés".to_string()
    } else {
        analysis.domains.join(", ")
    };

    let level = analysis
        .level_hint
        .map(|l| l.to_string())
        .unwrap_or_else(|| "Non spécifié".to_string());

    let held = if analysis.held_certifications.is_empty() {
        "Aucune".to_string()
    } else {
        analysis.held_certifications.join(", ")
    };

    template
        .replace("{question}", question)
        .replace("{detected_skills}", &detected_skills)
        .replace("{domains}", &domains)
        .replace("{level}", &level)
        .replace("{experience_years}", &analysis.experience_years.to_string())
        .replace("{held_certifications}", &held)
        .replace(
            "{recommendations}",
            &format_recommendations(&result.recommendations),
        )
}

/// Renders the top 10 recommendations as one line each, in the exact shape
/// the prompt rules tell the model to copy from.
pub fn format_recommendations(recommendations: &[Candidate]) -> String {
    if recommendations.is_empty() {
        return "Aucune certification trouvée.".to_string();
    }

    recommendations
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, cert)| {
            let price = cert
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "N/A".to_string());
            let duration = cert.duration.as_deref().unwrap_or("N/A");
            let mut line = format!(
                "{}. {} | Niveau: {} | Prix: {price}€ | Durée: {duration} | Score: {:.0}%",
                i + 1,
                cert.title,
                cert.level,
                cert.ranking_score()
            );
            if !cert.matched_skills.is_empty() {
                let matched: Vec<&str> = cert
                    .matched_skills
                    .iter()
                    .take(3)
                    .map(String::as_str)
                    .collect();
                line.push_str(&format!(" | Compétences matchées: {}", matched.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the top 5 evidence entries for the reasoning prompt section.
pub fn format_evidence(reasoning: &Reasoning) -> String {
    let lines: Vec<String> = reasoning
        .recommendation_evidence
        .iter()
        .take(5)
        .map(|item| format!("- {}: {}", item.certification, item.match_reason))
        .collect();

    if lines.is_empty() {
        "Correspondance basée sur le domaine".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::llm_client::LlmError;
    use crate::models::profile::SkillAnalysis;
    use crate::reco::reasoning::build_reasoning;

    struct EchoLlm;

    #[async_trait]
    impl TextGenerator for EchoLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    struct DownLlm;

    #[async_trait]
    impl TextGenerator for DownLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            _prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Err(LlmError::RateLimited { retries: 3 })
        }
    }

    fn result_with(recommendations: Vec<Candidate>) -> RecommendationResult {
        let analysis = SkillAnalysis::default();
        let reasoning = build_reasoning(&analysis, None, &recommendations);
        RecommendationResult {
            skill_analysis: analysis,
            recommendations,
            reasoning,
        }
    }

    fn cert(title: &str, matched: &[&str]) -> Candidate {
        Candidate {
            title: title.to_string(),
            level: "Débutant".to_string(),
            price: Some(150.0),
            duration: Some("3 mois".to_string()),
            relevance_score: 87.4,
            matched_skills: matched.iter().map(|s| s.to_string()).collect(),
            skill_matches: matched.len(),
            ..Candidate::default()
        }
    }

    #[test]
    fn test_social_detection_short_messages() {
        assert!(is_social_message("Bonjour !"));
        assert!(is_social_message("merci beaucoup"));
        assert!(is_social_message("ok, parfait."));
        assert!(!is_social_message("quelle certification cloud pour un débutant ?"));
    }

    #[test]
    fn test_social_detection_rejects_long_messages() {
        // Contains "bonjour" but carries real intent
        assert!(!is_social_message(
            "bonjour je cherche une certification data pour un profil avec cinq ans d'expérience"
        ));
    }

    #[test]
    fn test_format_recommendations_line_shape() {
        let formatted = format_recommendations(&[cert("AWS Cloud Practitioner", &["aws", "cloud"])]);
        assert_eq!(
            formatted,
            "1. AWS Cloud Practitioner | Niveau: Débutant | Prix: 150€ | Durée: 3 mois | Score: 87% | Compétences matchées: aws, cloud"
        );
    }

    #[test]
    fn test_format_recommendations_empty() {
        assert_eq!(format_recommendations(&[]), "Aucune certification trouvée.");
    }

    #[test]
    fn test_format_recommendations_caps_at_ten() {
        let certs: Vec<Candidate> = (0..12).map(|i| cert(&format!("C{i}"), &[])).collect();
        assert_eq!(format_recommendations(&certs).lines().count(), 10);
    }

    #[test]
    fn test_format_evidence_caps_at_five() {
        let certs: Vec<Candidate> = (0..7).map(|i| cert(&format!("C{i}"), &["aws"])).collect();
        let result = result_with(certs);
        assert_eq!(format_evidence(&result.reasoning).lines().count(), 5);
    }

    #[tokio::test]
    async fn test_graph_reasoning_prompt_carries_evidence() {
        let result = result_with(vec![cert("Azure Fundamentals", &["azure"])]);
        let answer = ask_with_evidence(
            &EchoLlm,
            "quelle certification ?",
            Some(&result),
            "",
            AnswerMode::GraphReasoning,
        )
        .await;

        assert!(answer.contains("Azure Fundamentals"));
        assert!(answer.contains("quelle certification ?"));
        assert!(answer.contains("Correspondance partielle"));
        assert!(!answer.contains("{recommendations}"));
        assert!(!answer.contains("{evidence}"));
    }

    #[tokio::test]
    async fn test_pdf_mode_uses_cv_template() {
        let result = result_with(vec![cert("Azure Fundamentals", &["azure"])]);
        let answer = ask_with_evidence(
            &EchoLlm,
            "que me conseilles-tu ?",
            Some(&result),
            "",
            AnswerMode::PdfWithGraph,
        )
        .await;
        assert!(answer.contains("PROFIL CV ANALYSÉ"));
        assert!(answer.contains("Azure Fundamentals"));
    }

    #[tokio::test]
    async fn test_social_prompt_ignores_evidence() {
        let result = result_with(vec![cert("Azure Fundamentals", &[])]);
        let answer =
            ask_with_evidence(&EchoLlm, "merci", Some(&result), "", AnswerMode::Social).await;
        assert!(answer.contains("CertiBot"));
        assert!(!answer.contains("Azure Fundamentals"));
    }

    #[tokio::test]
    async fn test_missing_evidence_falls_back() {
        let answer = ask_with_evidence(
            &EchoLlm,
            "question",
            None,
            "",
            AnswerMode::GraphReasoning,
        )
        .await;
        assert!(answer.contains("expert en certifications professionnelles"));
    }

    #[tokio::test]
    async fn test_llm_failure_returns_inline_error() {
        let answer =
            ask_with_evidence(&DownLlm, "merci", None, "", AnswerMode::Social).await;
        assert!(answer.starts_with("Erreur lors de la génération de la réponse:"));
    }
}
