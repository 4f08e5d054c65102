use czarbot::prelude::*;
use czarbot_transport::TransportError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Console transport
// ---------------------------------------------------------------------------

/// Plays the chat server on a terminal.
///
/// Each stdin line is one event in the first channel, or in the one named
/// by a leading `#channel`:
///
/// ```text
/// alice !start        alice says "!start"
/// #party bob !join    bob says "!join" in #party
/// +carol              carol joins the channel
/// -carol              carol leaves it
/// ```
struct ConsoleTransport {
    default_channel: ChannelName,
    input: Mutex<Lines<BufReader<Stdin>>>,
    output: Mutex<Stdout>,
}

impl ConsoleTransport {
    fn new(default_channel: ChannelName) -> Self {
        Self {
            default_channel,
            input: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            output: Mutex::new(tokio::io::stdout()),
        }
    }

    async fn print(&self, line: String) -> Result<(), TransportError> {
        let mut output = self.output.lock().await;
        output
            .write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(TransportError::SendFailed)?;
        output.flush().await.map_err(TransportError::SendFailed)
    }
}

impl ChatTransport for ConsoleTransport {
    async fn join(&self, channel: &ChannelName) -> Result<(), TransportError> {
        self.print(format!("* joined {channel}")).await
    }

    async fn say(&self, channel: &ChannelName, text: &str) -> Result<(), TransportError> {
        self.print(format!("{channel} <czarbot> {text}")).await
    }

    async fn whisper(
        &self,
        channel: &ChannelName,
        nick: &Nick,
        text: &str,
    ) -> Result<(), TransportError> {
        self.print(format!("{channel} (to {nick}) {text}")).await
    }

    async fn next_event(&self) -> Result<Option<InboundEvent>, TransportError> {
        let mut input = self.input.lock().await;
        loop {
            let Some(line) = input
                .next_line()
                .await
                .map_err(TransportError::ReceiveFailed)?
            else {
                return Ok(None);
            };
            if let Some(event) = parse_line(&line, &self.default_channel) {
                return Ok(Some(event));
            }
        }
    }
}

fn parse_line(line: &str, default_channel: &ChannelName) -> Option<InboundEvent> {
    let line = line.trim();
    let (channel, rest) = match line.strip_prefix('#') {
        Some(_) => {
            let (channel, rest) = line.split_once(char::is_whitespace)?;
            (ChannelName::new(channel), rest.trim_start())
        }
        None => (default_channel.clone(), line),
    };

    if let Some(nick) = rest.strip_prefix('+') {
        return (!nick.is_empty()).then(|| InboundEvent::Join {
            channel,
            nick: Nick::new(nick),
        });
    }
    if let Some(nick) = rest.strip_prefix('-') {
        return (!nick.is_empty()).then(|| InboundEvent::Part {
            channel,
            nick: Nick::new(nick),
        });
    }
    let (nick, text) = rest.split_once(char::is_whitespace)?;
    Some(InboundEvent::PublicMessage {
        channel,
        nick: Nick::new(nick),
        text: text.trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

async fn serve<S: CardSupplier>(config: BotConfig, supplier: S) -> Result<(), CzarbotError> {
    let default_channel = config
        .channel_names()
        .into_iter()
        .next()
        .unwrap_or_else(|| ChannelName::new("#cah"));
    let transport = ConsoleTransport::new(default_channel);
    CzarBotBuilder::new()
        .config(config)
        .build(supplier, transport)?
        .run()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    czarbot::init_tracing();

    let mut config = match std::env::args().nth(1) {
        Some(path) => BotConfig::from_file(path).await?,
        None => BotConfig::default(),
    };
    if config.channels.is_empty() {
        config.channels.push("#cah".to_string());
    }
    tracing::info!(channels = ?config.channels, "starting console bot");

    match config.card_file.clone() {
        Some(path) => serve(config, JsonCardSupplier::new(path)).await?,
        None => serve(config, StaticCardSupplier::generated(60, 600)).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cah() -> ChannelName {
        ChannelName::new("#cah")
    }

    #[test]
    fn test_plain_line_is_a_message_in_the_default_channel() {
        assert_eq!(
            parse_line("alice !play 1 2", &cah()),
            Some(InboundEvent::PublicMessage {
                channel: cah(),
                nick: Nick::new("alice"),
                text: "!play 1 2".into(),
            })
        );
    }

    #[test]
    fn test_channel_prefix() {
        assert_eq!(
            parse_line("#party bob !join", &cah()),
            Some(InboundEvent::PublicMessage {
                channel: ChannelName::new("#party"),
                nick: Nick::new("bob"),
                text: "!join".into(),
            })
        );
    }

    #[test]
    fn test_join_and_part_markers() {
        assert_eq!(
            parse_line("+carol", &cah()),
            Some(InboundEvent::Join {
                channel: cah(),
                nick: Nick::new("carol"),
            })
        );
        assert_eq!(
            parse_line("#party -carol", &cah()),
            Some(InboundEvent::Part {
                channel: ChannelName::new("#party"),
                nick: Nick::new("carol"),
            })
        );
    }

    #[test]
    fn test_lines_without_text_are_skipped() {
        assert_eq!(parse_line("", &cah()), None);
        assert_eq!(parse_line("alice", &cah()), None);
        assert_eq!(parse_line("+", &cah()), None);
    }
}
