//! Kerberos principal identity as handed to the hooks by the host.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Kerberos principal: one or more name components plus a realm.
///
/// The first component is the base name; any further component (such as the
/// `admin` in `alice/admin@EXAMPLE.COM`) is an instance. The hooks only read
/// principals; they never construct or modify the host's copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    components: Vec<String>,
    realm: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrincipalParseError {
    #[error("principal name is empty")]
    Empty,

    #[error("principal name has no realm")]
    MissingRealm,

    #[error("principal name has an empty realm")]
    EmptyRealm,

    #[error("principal name has more than one realm separator")]
    ExtraRealmSeparator,

    #[error("component separator in realm")]
    MalformedRealm,

    #[error("principal name ends with an escape character")]
    TrailingEscape,
}

impl Principal {
    pub fn new<I, S>(components: I, realm: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
            realm: realm.into(),
        }
    }

    /// Single-component principal (`name@REALM`).
    pub fn user(name: impl Into<String>, realm: impl Into<String>) -> Self {
        Self::new([name.into()], realm)
    }

    /// Parse the canonical textual form, honouring `\` escapes.
    pub fn parse(s: &str) -> Result<Self, PrincipalParseError> {
        if s.is_empty() {
            return Err(PrincipalParseError::Empty);
        }

        let mut components = Vec::new();
        let mut current = String::new();
        let mut realm: Option<String> = None;
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or(PrincipalParseError::TrailingEscape)?;
                    current.push(unescape(escaped));
                }
                '/' if realm.is_some() => return Err(PrincipalParseError::MalformedRealm),
                '/' => components.push(core::mem::take(&mut current)),
                '@' if realm.is_some() => return Err(PrincipalParseError::ExtraRealmSeparator),
                '@' => {
                    components.push(core::mem::take(&mut current));
                    realm = Some(String::new());
                }
                other => current.push(other),
            }
        }

        match realm {
            None => Err(PrincipalParseError::MissingRealm),
            Some(_) if current.is_empty() => Err(PrincipalParseError::EmptyRealm),
            Some(_) => Ok(Self {
                components,
                realm: current,
            }),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Base name (first component), if any.
    pub fn name(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    /// Second component, if any.
    pub fn instance(&self) -> Option<&str> {
        self.components.get(1).map(String::as_str)
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Number of name components (excluding the realm).
    pub fn size(&self) -> usize {
        self.components.len()
    }

    pub fn has_instance(&self) -> bool {
        self.size() > 1
    }
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'b' => '\u{8}',
        '0' => '\0',
        other => other,
    }
}

fn write_escaped(f: &mut core::fmt::Formatter<'_>, part: &str) -> core::fmt::Result {
    for c in part.chars() {
        match c {
            '/' | '@' | '\\' => write!(f, "\\{c}")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            '\0' => f.write_str("\\0")?,
            other => write!(f, "{other}")?,
        }
    }
    Ok(())
}

impl core::fmt::Display for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (idx, component) in self.components.iter().enumerate() {
            if idx > 0 {
                f.write_str("/")?;
            }
            write_escaped(f, component)?;
        }
        f.write_str("@")?;
        write_escaped(f, &self.realm)
    }
}

impl FromStr for Principal {
    type Err = PrincipalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
