use adgate_conversions::identity::{hash, normalize, IdentifierKind};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HashKind {
    Email,
    Phone,
    FirstName,
    LastName,
}

impl From<HashKind> for IdentifierKind {
    fn from(kind: HashKind) -> Self {
        match kind {
            HashKind::Email => IdentifierKind::Email,
            HashKind::Phone => IdentifierKind::Phone,
            HashKind::FirstName => IdentifierKind::FirstName,
            HashKind::LastName => IdentifierKind::LastName,
        }
    }
}

/// Hash an identity value exactly as the gateway does before upload
#[derive(Args)]
pub struct HashCommand {
    /// Kind of identity field
    #[arg(long, value_enum)]
    pub kind: HashKind,

    /// Raw value to normalize and hash
    pub value: String,
}

impl HashCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let kind = IdentifierKind::from(self.kind);
        let normalized = normalize(kind, &self.value).ok_or_else(|| {
            anyhow::anyhow!("{} is empty after normalization and would not be sent", kind)
        })?;

        println!("normalized: {}", normalized);
        println!("sha256:     {}", hash(&normalized));
        Ok(())
    }
}
