//! Shared constants for sofia-chat.

/// Replies longer than this many characters are split into chunks.
pub const CHUNK_MAX_CHARS: usize = 150;

/// Maximum characters of user input echoed back in a fallback reply.
pub const FALLBACK_ECHO_MAX_CHARS: usize = 180;

/// Key-value namespace for per-day transcripts.
pub const TRANSCRIPT_NAMESPACE: &str = "conversations";

/// Key-value namespace for saved onboarding profiles.
pub const PROFILE_NAMESPACE: &str = "profile";

/// Shown in the transcript when a turn could not be produced at all.
pub const ERROR_REPLY: &str =
    "Desculpe, ocorreu um erro ao processar sua mensagem. Tente novamente.";

/// Persona greeting used when there is nothing to respond to.
pub const GREETING_REPLY: &str = "Olá, eu sou a Dra. Sofia. Como você está chegando hoje?";

/// Generic follow-up prompts used when the model is unavailable.
pub const FALLBACK_REPLIES: &[&str] = &[
    "Entendo. O que mais te preocupa sobre isso?",
    "Percebo que isso é importante para você. Como se sente agora falando sobre isso?",
    "Isso deve ser difícil. Quando começou a perceber esses sentimentos?",
    "Obrigada por compartilhar. O que você gostaria de explorar primeiro?",
    "Vejo que há muito acontecendo. Qual parte pesa mais?",
    "Como isso tem afetado você no dia a dia?",
    "O que passa pela sua cabeça quando isso acontece?",
];

/// Default system instruction sent to the model.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é a Dra. Sofia, uma psicóloga acolhedora e \
     empática. Responda em português do Brasil, com frases curtas e naturais, faça uma \
     pergunta aberta por vez e nunca dê diagnósticos. Em caso de risco, oriente o contato \
     com o CVV (188) ou o serviço de emergência mais próximo.";
