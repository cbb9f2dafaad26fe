use clap::ValueEnum;
use insights_engine::RankOrder;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum RankOrderFlag {
    Enumeration,
    Score,
}

impl RankOrderFlag {
    pub(crate) const fn as_domain(self) -> RankOrder {
        match self {
            RankOrderFlag::Enumeration => RankOrder::Enumeration,
            RankOrderFlag::Score => RankOrder::Score,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum SchemaKindFlag {
    /// Offline input: realms of feature-tagged sessions
    Input,
    /// Online corpus: ranked insights with tags and features
    Corpus,
}

impl SchemaKindFlag {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            SchemaKindFlag::Input => "input",
            SchemaKindFlag::Corpus => "corpus",
        }
    }
}
