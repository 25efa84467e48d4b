use std::fmt;
use std::str::FromStr;

use crate::error::{ChaincodeError, ChaincodeResult};

/// The functions this chaincode answers to on invoke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    InitProfile,
    UpdateProfile,
    DeleteProfile,
    GetProfileById,
}

/// How many positional arguments an operation takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::InitProfile,
        Operation::UpdateProfile,
        Operation::DeleteProfile,
        Operation::GetProfileById,
    ];

    /// The invoke function name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitProfile => "initProfile",
            Self::UpdateProfile => "updateProfile",
            Self::DeleteProfile => "deleteProfile",
            Self::GetProfileById => "getProfileByID",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            Self::InitProfile => Arity::Exactly(3),
            Self::UpdateProfile => Arity::AtLeast(4),
            Self::DeleteProfile => Arity::Exactly(1),
            Self::GetProfileById => Arity::AtLeast(1),
        }
    }

    /// Whether the operation writes to the world state.
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::GetProfileById)
    }

    /// Check `args` against this operation's arity.
    pub fn check_args<'a>(&self, args: &'a [String]) -> ChaincodeResult<&'a [String]> {
        let ok = match self.arity() {
            Arity::Exactly(n) => args.len() == n,
            Arity::AtLeast(n) => args.len() >= n,
        };
        if ok {
            return Ok(args);
        }
        Err(ChaincodeError::BadArgumentCount {
            function: self.name(),
            expected: match self {
                Self::InitProfile => "3",
                Self::UpdateProfile => "at least 4",
                Self::DeleteProfile => "1",
                Self::GetProfileById => "at least 1",
            },
            actual: args.len(),
        })
    }
}

impl FromStr for Operation {
    type Err = ChaincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ChaincodeError::UnknownFunction(s.to_owned()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
