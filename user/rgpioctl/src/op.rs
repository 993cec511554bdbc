//! Operations given on the command line as `OP:TARGET[:VALUE]`.

use std::{fmt, str::FromStr};

use rgpio::{File, FileError, dev::GpioLine};
use rgpio_api::{Command, Payload};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Read,
    Write,
    SetShadow,
    GetShadow,
    SetLine,
    GetLine,
}

impl OpKind {
    const NAMES: [(&'static str, OpKind); 6] = [
        ("read", OpKind::Read),
        ("write", OpKind::Write),
        ("set-shadow", OpKind::SetShadow),
        ("get-shadow", OpKind::GetShadow),
        ("set-line", OpKind::SetLine),
        ("get-line", OpKind::GetLine),
    ];

    fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("?", |(name, _)| *name)
    }

    fn takes_value(self) -> bool {
        matches!(self, OpKind::Write | OpKind::SetShadow | OpKind::SetLine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    /// Node name, `/dev/` path or mapping alias.
    pub target: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpParseError {
    #[error("expected OP:TARGET[:VALUE], got '{0}'")]
    Syntax(String),
    #[error("unknown operation '{0}'")]
    UnknownOp(String),
    #[error("'{0}' needs a value")]
    MissingValue(&'static str),
    #[error("'{0}' takes no value")]
    UnexpectedValue(&'static str),
    #[error("'{0}' is not a 32-bit integer")]
    BadValue(String),
}

impl FromStr for Op {
    type Err = OpParseError;

    fn from_str(s: &str) -> Result<Op, OpParseError> {
        let mut parts = s.splitn(3, ':');
        let (Some(op), Some(target)) = (parts.next(), parts.next()) else {
            return Err(OpParseError::Syntax(s.to_string()));
        };
        if target.is_empty() {
            return Err(OpParseError::Syntax(s.to_string()));
        }
        let kind = OpKind::NAMES
            .iter()
            .find(|(name, _)| *name == op)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| OpParseError::UnknownOp(op.to_string()))?;
        let value = parts.next().map(str::to_string);
        match (kind.takes_value(), &value) {
            (true, None) => return Err(OpParseError::MissingValue(kind.name())),
            (false, Some(_)) => return Err(OpParseError::UnexpectedValue(kind.name())),
            (true, Some(v)) if kind != OpKind::Write && v.parse::<i32>().is_err() => {
                return Err(OpParseError::BadValue(v.clone()));
            }
            _ => {}
        }
        Ok(Op {
            kind,
            target: target.to_string(),
            value,
        })
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.target)?;
        if let Some(value) = &self.value {
            write!(f, ":{}", value)?;
        }
        Ok(())
    }
}

impl Op {
    /// Run against an open session and describe the result.
    pub fn run<L: GpioLine>(&self, file: &mut File<'_, L>) -> Result<String, FileError> {
        let value = self.value.as_deref().unwrap_or_default();
        match self.kind {
            OpKind::Read => {
                let mut buf = [0u8; config::IO_BUFFER_LEN];
                let n = file.read(&mut buf[..])?;
                Ok(String::from_utf8_lossy(&buf[..n]).trim_end().to_string())
            }
            OpKind::Write => {
                let text = format!("{value}\n");
                let n = file.write(text.as_bytes())?;
                Ok(format!("{n} bytes"))
            }
            OpKind::SetShadow | OpKind::SetLine => {
                let cmd = if self.kind == OpKind::SetShadow {
                    Command::SetShadow
                } else {
                    Command::SetLine
                };
                let value = value.parse().map_err(|_| FileError::InvalidArgument)?;
                let mut arg = Payload(value).to_bytes();
                file.ioctl(cmd.into(), &mut arg[..])?;
                Ok("ok".to_string())
            }
            OpKind::GetShadow | OpKind::GetLine => {
                let cmd = if self.kind == OpKind::GetShadow {
                    Command::GetShadow
                } else {
                    Command::GetLine
                };
                let mut out = [0u8; Payload::LEN];
                file.ioctl(cmd.into(), &mut out[..])?;
                Ok(Payload::from_bytes(out).0.to_string())
            }
        }
    }
}
