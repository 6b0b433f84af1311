use granat_catalog::CategoryScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Conversation state of one chat.
pub enum Session {
    /// No pending interaction.
    #[default]
    Idle,
    /// A search was requested; the user must pick a component family.
    AwaitingCategoryChoice,
    /// The next free-text message is a search query.
    AwaitingQuery { category: Option<CategoryScope> },
}

impl Session {
    /// Stable label used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingCategoryChoice => "awaiting_category_choice",
            Self::AwaitingQuery { category: None } => "awaiting_query",
            Self::AwaitingQuery {
                category: Some(CategoryScope::Mobile),
            } => "awaiting_query_mobile",
            Self::AwaitingQuery {
                category: Some(CategoryScope::Web),
            } => "awaiting_query_web",
            Self::AwaitingQuery {
                category: Some(CategoryScope::Any),
            } => "awaiting_query_any",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
