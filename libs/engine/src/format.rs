use std::str::FromStr;
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

use serde::ser::{Serialize, Serializer};
use serde::de::{self, Deserialize, Deserializer};
use failure_derive::Fail;

use script::MappingTree;

use crate::{MappingEmitter, ProguardEmitter, SrgEmitter};

/// The text formats compiled mappings can be emitted as
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EmitFormat {
    Proguard,
    Srg
}
impl EmitFormat {
    pub const ALL: [EmitFormat; 2] = [EmitFormat::Proguard, EmitFormat::Srg];
    #[inline]
    pub fn id(self) -> &'static str {
        match self {
            EmitFormat::Proguard => "proguard",
            EmitFormat::Srg => "srg",
        }
    }
    fn from_id(id: &str) -> Option<EmitFormat> {
        EmitFormat::ALL.iter().cloned()
            .find(|format| format.id().eq_ignore_ascii_case(id))
    }
    pub fn emitter(self) -> &'static dyn MappingEmitter {
        match self {
            EmitFormat::Proguard => &ProguardEmitter,
            EmitFormat::Srg => &SrgEmitter,
        }
    }
    #[inline]
    pub fn emit(self, tree: &MappingTree, version: Option<&str>, out: &mut dyn Write) -> io::Result<()> {
        self.emitter().emit(tree, version, out)
    }
    /// Emit several trees into one output.
    ///
    /// ProGuard output separates the trees with a blank line, like its classes.
    pub fn emit_all(self, trees: &[MappingTree], version: Option<&str>, out: &mut dyn Write) -> io::Result<()> {
        let mut first = true;
        for tree in trees.iter().filter(|tree| !tree.classes.is_empty()) {
            if !first && self == EmitFormat::Proguard {
                writeln!(out)?;
            }
            first = false;
            self.emit(tree, version, out)?;
        }
        Ok(())
    }
    pub fn emit_to_string(self, tree: &MappingTree, version: Option<&str>) -> String {
        let mut buffer = Vec::new();
        // Writing to a vec can't fail
        let _ = self.emit(tree, version, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
impl FromStr for EmitFormat {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, InvalidFormat> {
        EmitFormat::from_id(s).ok_or_else(|| InvalidFormat(s.into()))
    }
}
impl Display for EmitFormat {
    #[inline]
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}
impl<'de> Deserialize<'de> for EmitFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where
        D: Deserializer<'de> {
        struct EmitFormatVisitor;
        impl<'de> de::Visitor<'de> for EmitFormatVisitor {
            type Value = EmitFormat;

            fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
                formatter.write_str("an emit format")
            }

            #[inline]
            fn visit_str<E>(self, s: &str) -> Result<EmitFormat, E> where
                E: de::Error, {
                EmitFormat::from_str(s).map_err(E::custom)
            }
        }
        deserializer.deserialize_str(EmitFormatVisitor)
    }
}
impl Serialize for EmitFormat {
    #[inline]
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where
        S: Serializer {
        serializer.serialize_str(self.id())
    }
}

#[derive(Debug, Fail)]
#[fail(display = "Invalid emit format {:?}", _0)]
pub struct InvalidFormat(pub String);
