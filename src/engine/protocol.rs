//! Lines of the engine protocol.
//!
//! Every message is one line of whitespace separated tokens, starting
//! with an upper case keyword.

use std::fmt::Display;

use strum::{Display as StrumDisplay, EnumIs, EnumString};

/// Type tag of an engine parameter.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum ParameterKind {
    INT,
    FLOAT,
    BOOL,
    STRING,
}

/// A message sent by the engine.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs)]
pub enum EngineMessage {
    Ready,
    /// `None` when the engine considers the game over.
    BestMove(Option<String>),
    Parameters(Vec<String>),
    Parameter {
        name: String,
        kind: ParameterKind,
        value: String,
    },
    Name(String),
    /// Search progress. Anything after the depth is ignored.
    Info {
        depth: Option<u32>,
    },
    /// A line that is not part of the protocol, or a malformed one.
    Unknown(String),
}

impl EngineMessage {
    pub fn parse(line: &str) -> Self {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let unknown = || Self::Unknown(line.to_string());

        match tokens.as_slice() {
            ["READY"] => Self::Ready,
            ["BESTMOVE", "none"] => Self::BestMove(None),
            ["BESTMOVE", mv] => Self::BestMove(Some(mv.to_string())),
            ["PARAMETERS", names @ ..] => {
                Self::Parameters(names.iter().map(|s| s.to_string()).collect())
            }
            ["PARAMETER", name, kind, value @ ..] if !value.is_empty() => match kind.parse() {
                Ok(kind) => Self::Parameter {
                    name: name.to_string(),
                    kind,
                    value: value.join(" "),
                },
                Err(_) => unknown(),
            },
            ["NAME", name @ ..] if !name.is_empty() => Self::Name(name.join(" ")),
            ["INFO", rest @ ..] => Self::Info {
                depth: rest
                    .iter()
                    .position(|&token| token == "depth")
                    .and_then(|i| rest.get(i + 1))
                    .and_then(|depth| depth.parse().ok()),
            },
            _ => unknown(),
        }
    }
}

/// A command sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    Init,
    NewGame(Option<String>),
    Go,
    Stop,
    Move(String),
    GetParameters,
    GetParameter(String),
    SetParameter { name: String, value: String },
    GetName,
    Quit,
}

impl Display for HostCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => f.write_str("INIT"),
            Self::NewGame(None) => f.write_str("NEWGAME"),
            Self::NewGame(Some(position)) => write!(f, "NEWGAME {position}"),
            Self::Go => f.write_str("GO"),
            Self::Stop => f.write_str("STOP"),
            Self::Move(mv) => write!(f, "MOVE {mv}"),
            Self::GetParameters => f.write_str("GETPARAMETERS"),
            Self::GetParameter(name) => write!(f, "GETPARAMETER {name}"),
            Self::SetParameter { name, value } => write!(f, "SETPARAMETER {name} {value}"),
            Self::GetName => f.write_str("GETNAME"),
            Self::Quit => f.write_str("QUIT"),
        }
    }
}

#[test]
fn engine_messages() {
    use EngineMessage::*;

    assert_eq!(EngineMessage::parse("READY"), Ready);
    assert_eq!(EngineMessage::parse("BESTMOVE none"), BestMove(None));
    assert_eq!(
        EngineMessage::parse("BESTMOVE 22x18"),
        BestMove(Some("22x18".to_string()))
    );
    assert_eq!(
        EngineMessage::parse("PARAMETERS depth eval_piece"),
        Parameters(vec!["depth".to_string(), "eval_piece".to_string()])
    );
    assert_eq!(EngineMessage::parse("PARAMETERS"), Parameters(vec![]));
    assert_eq!(
        EngineMessage::parse("PARAMETER depth int 6"),
        Parameter {
            name: "depth".to_string(),
            kind: ParameterKind::INT,
            value: "6".to_string()
        }
    );
    assert_eq!(
        EngineMessage::parse("NAME cherry"),
        Name("cherry".to_string())
    );
    assert_eq!(
        EngineMessage::parse("INFO depth 7 nodes 120000 eval -3"),
        Info { depth: Some(7) }
    );
    assert_eq!(EngineMessage::parse("INFO nodes 5"), Info { depth: None });
}

#[test]
fn malformed_engine_messages() {
    for line in [
        "",
        "ready",
        "BESTMOVE",
        "BESTMOVE 22x18 11x15",
        "PARAMETER depth integer 6",
        "PARAMETER depth int",
        "NAME",
    ] {
        assert_eq!(
            EngineMessage::parse(line),
            EngineMessage::Unknown(line.to_string())
        );
    }
}

#[test]
fn host_commands() {
    assert_eq!(HostCommand::NewGame(None).to_string(), "NEWGAME");
    assert_eq!(
        HostCommand::NewGame(Some("W:WK2:BK30".to_string())).to_string(),
        "NEWGAME W:WK2:BK30"
    );
    assert_eq!(
        HostCommand::SetParameter {
            name: "depth".to_string(),
            value: "5".to_string()
        }
        .to_string(),
        "SETPARAMETER depth 5"
    );
    assert_eq!(ParameterKind::FLOAT.to_string(), "float");
}
