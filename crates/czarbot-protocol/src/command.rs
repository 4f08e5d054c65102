//! The chat command grammar.
//!
//! Commands are recognized by prefix, the way chat users type them:
//! `!play 3`, `!play 3 7`, `!winner 0`. Anything that doesn't start with a
//! known prefix is ordinary chatter and parses to `Ok(None)`.

use crate::ParseError;

/// Summary shown by `!help`.
pub const HELP_TEXT: &str = "Commands: !start [points] to start a game, !join to join, \
!play # (or !play # #) to play cards, !winner # to pick the winner as czar, \
!quit to leave, !cards !points !list !status for info";

const START_USAGE: &str = "!start or !start <points>";
const PLAY_USAGE: &str = "!play # or !play # #";
const WINNER_USAGE: &str = "!winner #";

/// The most card indexes a single `!play` carries.
pub const MAX_PLAY_ARGS: usize = 2;

/// A parsed chat command with validated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start a game in this channel, optionally overriding the points needed
    /// to win.
    Start { points_to_win: Option<u32> },

    /// Join the channel's game.
    Join,

    /// Play one or two answer cards, by hand index.
    Play(Vec<usize>),

    /// As czar, pick the winning submission by its shown index.
    Winner(usize),

    /// Leave the game.
    Quit,

    // -- Reserved / informational --
    Pause,
    Resume,
    Cards,
    Points,
    List,
    Status,
    Help,
}

/// Keywords without their `!`, in match order.
#[derive(Clone, Copy)]
enum Keyword {
    Start,
    Join,
    Play,
    Winner,
    Quit,
    Pause,
    Resume,
    Cards,
    Points,
    List,
    Status,
    Help,
}

const VOCABULARY: &[(&str, Keyword)] = &[
    ("!start", Keyword::Start),
    ("!join", Keyword::Join),
    ("!play", Keyword::Play),
    ("!winner", Keyword::Winner),
    ("!pick", Keyword::Winner),
    ("!quit", Keyword::Quit),
    ("!pause", Keyword::Pause),
    ("!resume", Keyword::Resume),
    ("!cards", Keyword::Cards),
    ("!points", Keyword::Points),
    ("!list", Keyword::List),
    ("!status", Keyword::Status),
    ("!help", Keyword::Help),
];

impl Command {
    /// Parses public channel text into a command.
    ///
    /// Returns `Ok(None)` for text that isn't a command. Prefixes are
    /// case-sensitive.
    ///
    /// # Errors
    /// Returns a [`ParseError`] when a known command has malformed or
    /// wrong-arity arguments.
    pub fn parse(text: &str) -> Result<Option<Self>, ParseError> {
        let text = text.trim();
        let Some((prefix, keyword)) = VOCABULARY
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
        else {
            return Ok(None);
        };
        let rest = &text[prefix.len()..];

        let command = match keyword {
            Keyword::Start => {
                let points = parse_indexes(rest, 0, 1, START_USAGE)?;
                let points_to_win = points
                    .first()
                    .map(|p| {
                        u32::try_from(*p).map_err(|_| ParseError::NotANumber {
                            arg: p.to_string(),
                            usage: START_USAGE,
                        })
                    })
                    .transpose()?;
                Self::Start { points_to_win }
            }
            Keyword::Join => Self::Join,
            Keyword::Play => {
                Self::Play(parse_indexes(rest, 1, MAX_PLAY_ARGS, PLAY_USAGE)?)
            }
            Keyword::Winner => {
                let picks = parse_indexes(rest, 1, 1, WINNER_USAGE)?;
                Self::Winner(picks[0])
            }
            Keyword::Quit => Self::Quit,
            Keyword::Pause => Self::Pause,
            Keyword::Resume => Self::Resume,
            Keyword::Cards => Self::Cards,
            Keyword::Points => Self::Points,
            Keyword::List => Self::List,
            Keyword::Status => Self::Status,
            Keyword::Help => Self::Help,
        };
        Ok(Some(command))
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Join => "join",
            Self::Play(_) => "play",
            Self::Winner(_) => "winner",
            Self::Quit => "quit",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Cards => "cards",
            Self::Points => "points",
            Self::List => "list",
            Self::Status => "status",
            Self::Help => "help",
        }
    }
}

/// Splits `args` on whitespace into `min..=max` non-negative integers.
fn parse_indexes(
    args: &str,
    min: usize,
    max: usize,
    usage: &'static str,
) -> Result<Vec<usize>, ParseError> {
    let words: Vec<&str> = args.split_whitespace().collect();
    if words.len() < min {
        return Err(ParseError::MissingArgument { usage });
    }
    if words.len() > max {
        return Err(ParseError::TooManyArguments { usage });
    }
    words
        .into_iter()
        .map(|word| {
            word.parse::<usize>().map_err(|_| ParseError::NotANumber {
                arg: word.to_string(),
                usage,
            })
        })
        .collect()
}
