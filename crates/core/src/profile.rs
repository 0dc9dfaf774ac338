//! Onboarding profile and the proactive messages derived from it.
//!
//! The profile is produced elsewhere (the onboarding questionnaire) and is
//! read-only here. Every field is optional so partially filled profiles load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const ANXIETY_CONCERN: &str = "Ansiedade e preocupação excessiva";
const SADNESS_CONCERN: &str = "Tristeza ou depressão";
const WORK_STRESS_CONCERN: &str = "Estresse no trabalho";
const ANXIETY_GOAL: &str = "Reduzir ansiedade e estresse";
const SELF_ESTEEM_GOAL: &str = "Melhorar autoestima e confiança";

const CHECK_IN_MESSAGE: &str = "Como você está se sentindo em relação ao que conversamos? \
     Há algo específico que gostaria de explorar mais profundamente?";

/// Self-reported onboarding answers. Levels are on a 1–10 scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserProfile {
    pub age_range: Option<String>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub relationship_status: Option<String>,

    pub previous_therapy: Option<bool>,
    pub current_medication: Option<bool>,
    pub mental_health_history: Vec<String>,

    pub main_concerns: Vec<String>,
    pub stress_level: Option<u8>,
    pub sleep_quality: Option<u8>,
    pub energy_level: Option<u8>,

    pub therapy_goals: Vec<String>,
    pub preferred_approach: Option<String>,

    pub exercise_frequency: Option<String>,
    pub social_support: Option<u8>,
    pub work_stress: Option<u8>,

    pub communication_style: Option<String>,
    pub coping_mechanisms: Vec<String>,
    pub triggers: Vec<String>,

    pub completed_at: Option<DateTime<Utc>>,
}

/// How actively the user has been replying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    High,
    Medium,
    Low,
}

/// First message of the therapeutic relationship, personalised by the profile.
#[must_use]
pub fn welcome_message(profile: &UserProfile) -> String {
    let mut content = String::from(
        "Olá, que bom te ver aqui! Sou a Dra. Sofia e estou muito feliz em iniciar esta \
         jornada terapêutica com você.\n\n",
    );

    if profile.previous_therapy == Some(true) {
        content.push_str(
            "Vejo que você já teve experiências anteriores com terapia. Isso mostra seu \
             comprometimento com o autocuidado.\n\n",
        );
    } else {
        content.push_str(
            "Como esta é sua primeira experiência com terapia, quero que saiba que este é um \
             espaço completamente seguro e acolhedor.\n\n",
        );
    }

    if let Some(concern) = profile.main_concerns.first() {
        let _ = write!(
            content,
            "Notei que {} é uma das suas principais preocupações no momento. ",
            concern.to_lowercase()
        );
        content.push_str(match concern.as_str() {
            ANXIETY_CONCERN => {
                "A ansiedade pode ser muito desafiadora, mas existem estratégias muito eficazes \
                 para lidar com ela.\n\n"
            },
            SADNESS_CONCERN => {
                "Reconheço a coragem que foi necessária para buscar ajuda. A tristeza profunda é \
                 algo que podemos trabalhar juntas.\n\n"
            },
            WORK_STRESS_CONCERN => {
                "O estresse profissional é muito comum hoje em dia. Vamos explorar formas de \
                 criar um equilíbrio mais saudável.\n\n"
            },
            _ => "É algo que podemos explorar e trabalhar juntas de forma cuidadosa.\n\n",
        });
    }

    if profile.stress_level.is_some_and(|level| level >= 7) {
        content.push_str(
            "Percebo que você está passando por um período de bastante estresse. Como você está \
             se sentindo neste exato momento? O que mais tem pesado na sua mente ultimamente?",
        );
    } else if profile.energy_level.is_some_and(|level| level <= 4) {
        content.push_str(
            "Vejo que sua energia tem estado baixa. Como tem sido acordar de manhã para você? O \
             que você sente que mais drena sua energia no dia a dia?",
        );
    } else {
        content.push_str(
            "Como você está chegando hoje? O que te motivou a buscar apoio terapêutico neste \
             momento da sua vida?",
        );
    }
    content
}

/// Proactive prompts in priority order. Empty when nothing in the profile stands out.
#[must_use]
pub fn follow_up_messages(profile: &UserProfile) -> Vec<&'static str> {
    let mut messages = Vec::new();
    if profile.stress_level.is_some_and(|level| level >= 7) {
        messages.push(
            "Percebo que você está passando por um período de muito estresse. Que tal começarmos \
             com algumas técnicas de respiração para te ajudar a se sentir mais centrado(a)?",
        );
    }
    if profile.sleep_quality.is_some_and(|level| level <= 4) {
        messages.push(
            "Vejo que o sono tem sido um desafio para você. O sono é fundamental para nossa saúde \
             mental. Vamos explorar o que pode estar interferindo no seu descanso?",
        );
    }
    if profile.main_concerns.iter().any(|c| c == ANXIETY_CONCERN) {
        messages.push(
            "Notei que a ansiedade é uma das suas principais preocupações. É muito corajoso da sua \
             parte buscar ajuda. Como a ansiedade tem se manifestado no seu dia a dia?",
        );
    }
    if profile.previous_therapy == Some(false) {
        messages.push(
            "Como esta é sua primeira experiência com terapia, quero que saiba que este é um \
             espaço completamente seguro. Não há julgamentos aqui, apenas acolhimento e \
             compreensão.",
        );
    }
    if profile.social_support.is_some_and(|level| level <= 4) {
        messages.push(
            "Percebo que você pode estar se sentindo um pouco isolado(a). Vamos conversar sobre \
             como podemos fortalecer sua rede de apoio?",
        );
    }
    messages
}

/// The highest-priority follow-up, or a generic check-in.
#[must_use]
pub fn follow_up_message(profile: &UserProfile) -> &'static str {
    follow_up_messages(profile).first().copied().unwrap_or(CHECK_IN_MESSAGE)
}

/// Assessment questions targeted at the user's goals and support network.
#[must_use]
pub fn assessment_questions(profile: &UserProfile) -> Vec<&'static str> {
    let mut questions = Vec::new();
    if profile.therapy_goals.iter().any(|g| g == ANXIETY_GOAL) {
        questions.push(
            "Vamos explorar um pouco mais sobre sua ansiedade. Em que momentos do dia ela costuma \
             ser mais intensa? Você consegue identificar situações específicas que a desencadeiam?",
        );
    }
    if profile.therapy_goals.iter().any(|g| g == SELF_ESTEEM_GOAL) {
        questions.push(
            "Gostaria de entender melhor como você se vê. Quando você pensa em suas qualidades, o \
             que vem primeiro à mente? E quais são as vozes críticas internas que mais te \
             incomodam?",
        );
    }
    if profile.social_support.is_some_and(|level| level <= 4) {
        questions.push(
            "Percebo que o suporte social tem sido um desafio. Como são seus relacionamentos mais \
             próximos atualmente? Você se sente compreendido(a) pelas pessoas ao seu redor?",
        );
    }
    questions
}

/// Whether the assistant should speak up unprompted.
///
/// True after three idle minutes in a short conversation, or after two idle
/// minutes when engagement is low.
#[must_use]
pub fn should_send_proactive(
    last_message_at: DateTime<Utc>,
    now: DateTime<Utc>,
    conversation_len: usize,
    engagement: Engagement,
) -> bool {
    let idle_secs = (now - last_message_at).num_seconds();
    if idle_secs > 3 * 60 && conversation_len < 5 {
        return true;
    }
    engagement == Engagement::Low && idle_secs > 2 * 60
}

/// Plain-text summary of the profile, appended to the model's system instruction.
#[must_use]
pub fn profile_context(profile: &UserProfile) -> String {
    fn opt(value: Option<&String>) -> &str {
        value.map_or("não informado", String::as_str)
    }
    fn level(value: Option<u8>) -> String {
        value.map_or_else(|| "?".to_owned(), |v| v.to_string())
    }
    fn yes_no(value: Option<bool>) -> &'static str {
        match value {
            Some(true) => "Sim",
            Some(false) => "Não",
            None => "não informado",
        }
    }

    let mut out = String::from("PERFIL DO PACIENTE");
    if let Some(completed_at) = profile.completed_at {
        let _ = write!(out, " - {}", completed_at.format("%d/%m/%Y"));
    }
    out.push_str(":\n\nDADOS DEMOGRÁFICOS:\n");
    let _ = writeln!(out, "- Faixa etária: {}", opt(profile.age_range.as_ref()));
    let _ = writeln!(out, "- Ocupação: {}", opt(profile.occupation.as_ref()));
    let _ =
        writeln!(out, "- Status de relacionamento: {}", opt(profile.relationship_status.as_ref()));

    out.push_str("\nHISTÓRICO CLÍNICO:\n");
    let _ = writeln!(out, "- Terapia anterior: {}", yes_no(profile.previous_therapy));
    let _ = writeln!(out, "- Medicação atual: {}", yes_no(profile.current_medication));
    let _ = writeln!(out, "- Histórico: {}", profile.mental_health_history.join(", "));

    out.push_str("\nESTADO ATUAL:\n");
    let _ = writeln!(out, "- Principais preocupações: {}", profile.main_concerns.join(", "));
    let _ = writeln!(out, "- Nível de estresse: {}/10", level(profile.stress_level));
    let _ = writeln!(out, "- Qualidade do sono: {}/10", level(profile.sleep_quality));
    let _ = writeln!(out, "- Nível de energia: {}/10", level(profile.energy_level));
    let _ = writeln!(out, "- Suporte social: {}/10", level(profile.social_support));

    out.push_str("\nOBJETIVOS TERAPÊUTICOS:\n");
    let _ = writeln!(out, "- Metas: {}", profile.therapy_goals.join(", "));
    let _ = writeln!(out, "- Abordagem preferida: {}", opt(profile.preferred_approach.as_ref()));

    out.push_str("\nRECURSOS E ESTRATÉGIAS:\n");
    let _ = writeln!(
        out,
        "- Mecanismos de enfrentamento: {}",
        profile.coping_mechanisms.join(", ")
    );
    if !profile.triggers.is_empty() {
        let _ = writeln!(out, "- Gatilhos identificados: {}", profile.triggers.join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn anxious_profile() -> UserProfile {
        UserProfile {
            previous_therapy: Some(false),
            main_concerns: vec![ANXIETY_CONCERN.to_owned()],
            stress_level: Some(8),
            sleep_quality: Some(3),
            social_support: Some(7),
            therapy_goals: vec![ANXIETY_GOAL.to_owned()],
            coping_mechanisms: vec!["Faço exercícios físicos".to_owned()],
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_partial_profile_deserializes() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"stress_level": 9, "main_concerns": ["Luto ou perda"]}"#)
                .unwrap();
        assert_eq!(profile.stress_level, Some(9));
        assert_eq!(profile.main_concerns, vec!["Luto ou perda".to_owned()]);
        assert!(profile.completed_at.is_none());
    }

    #[test]
    fn test_welcome_message_reflects_profile() {
        let text = welcome_message(&anxious_profile());
        assert!(text.contains("primeira experiência"));
        assert!(text.contains("ansiedade e preocupação excessiva"));
        assert!(text.contains("estratégias muito eficazes"));
        assert!(text.contains("bastante estresse"));
    }

    #[test]
    fn test_welcome_message_low_energy_branch() {
        let profile = UserProfile {
            previous_therapy: Some(true),
            energy_level: Some(3),
            stress_level: Some(4),
            ..UserProfile::default()
        };
        let text = welcome_message(&profile);
        assert!(text.contains("experiências anteriores"));
        assert!(text.contains("energia tem estado baixa"));
    }

    #[test]
    fn test_follow_ups_are_ordered_by_priority() {
        let messages = follow_up_messages(&anxious_profile());
        assert_eq!(messages.len(), 4);
        assert!(messages[0].contains("muito estresse"));
        assert!(messages[1].contains("sono"));
        assert!(messages[2].contains("ansiedade"));
        assert!(messages[3].contains("primeira experiência"));
    }

    #[test]
    fn test_follow_up_falls_back_to_check_in() {
        assert_eq!(follow_up_message(&UserProfile::default()), CHECK_IN_MESSAGE);
    }

    #[test]
    fn test_assessment_questions() {
        let mut profile = anxious_profile();
        profile.social_support = Some(2);
        let questions = assessment_questions(&profile);
        assert_eq!(questions.len(), 2);
        assert!(questions[0].contains("ansiedade"));
        assert!(questions[1].contains("suporte social"));
    }

    #[test]
    fn test_should_send_proactive() {
        let start = Utc.with_ymd_and_hms(2025, 9, 16, 10, 0, 0).unwrap();
        let four_min = start + chrono::Duration::minutes(4);
        let ninety_sec = start + chrono::Duration::seconds(150);

        assert!(should_send_proactive(start, four_min, 2, Engagement::High));
        assert!(!should_send_proactive(start, four_min, 8, Engagement::High));
        assert!(should_send_proactive(start, ninety_sec, 8, Engagement::Low));
        assert!(!should_send_proactive(start, ninety_sec, 8, Engagement::Medium));
    }

    #[test]
    fn test_profile_context_lists_fields() {
        let mut profile = anxious_profile();
        profile.completed_at = Some(Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap());
        let context = profile_context(&profile);
        assert!(context.starts_with("PERFIL DO PACIENTE - 15/09/2025"));
        assert!(context.contains("- Nível de estresse: 8/10"));
        assert!(context.contains("- Terapia anterior: Não"));
        assert!(!context.contains("Gatilhos"));
    }
}
