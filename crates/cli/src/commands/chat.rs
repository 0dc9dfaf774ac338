use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use sofia_core::constants::ERROR_REPLY;
use sofia_core::profile::profile_context;
use sofia_core::{Message, Role, SystemClock};
use sofia_llm::LlmClient;
use sofia_service::{
    ChatSession, NoDelay, ProxyClient, ReplyProvider, TurnService, TypingCadence,
};
use tokio::io::{AsyncBufReadExt as _, BufReader};

use super::open_store;

fn print_message(message: &Message) {
    let speaker = match message.role {
        Role::User => "você",
        Role::Assistant => "Sofia",
    };
    println!("[{}] {speaker}: {}", message.timestamp.format("%H:%M"), message.content);
}

fn provider(proxy_url: Option<String>) -> Result<Arc<dyn ReplyProvider>> {
    if let Some(url) = proxy_url {
        tracing::info!("Using proxy at {}", url);
        return Ok(Arc::new(ProxyClient::new(&url)?));
    }
    match LlmClient::from_env()? {
        Some(llm) => {
            tracing::info!(model = llm.model(), "Calling Gemini directly");
            Ok(Arc::new(llm))
        },
        None => bail!("Set SOFIA_PROXY_URL / --proxy-url, or GEMINI_API_KEY to call Gemini directly"),
    }
}

pub(crate) async fn run(
    db_path: &Path,
    user: &str,
    proxy_url: Option<String>,
    no_typing: bool,
) -> Result<()> {
    let store = open_store(db_path)?;
    let mut turns = TurnService::new(provider(proxy_url)?);
    if no_typing {
        turns = turns.with_delay(Arc::new(NoDelay)).with_cadence(TypingCadence::instant());
    }
    let turns = Arc::new(turns);
    let session = ChatSession::new(store, turns.clone(), Arc::new(SystemClock));

    if let Some(profile) = session.load_profile(user).await {
        turns.set_context(Some(profile_context(&profile)));
    }
    for message in session.load(user).await {
        print_message(&message);
    }
    if let Some(welcome) = session.greet(user).await? {
        print_message(&welcome);
    }
    println!("(/clear limpa a tela, /quit sai)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("(conversa limpa nesta tela; o histórico salvo foi mantido)");
                continue;
            },
            _ => {},
        }

        let mut sink = |chunk: &str| -> Result<()> {
            println!("Sofia: {chunk}");
            Ok(())
        };
        let reply = session.send_with_typing(line.trim(), user, &mut sink).await?;
        if reply.content == ERROR_REPLY {
            println!("Sofia: {}", reply.content);
        }
    }
    Ok(())
}
