/// One harvested entry. Every field is present; a field the source omits is
/// an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub published: String,
    pub category: String,
    pub authors: String,
    pub summary: String,
    pub comment: String,
}

/// The seven named columns of a persisted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Title,
    Summary,
    Time,
    Comment,
    Category,
    Authors,
}

impl Column {
    /// Columns in artifact order.
    pub const ALL: [Column; 7] = [
        Column::Id,
        Column::Title,
        Column::Summary,
        Column::Time,
        Column::Comment,
        Column::Category,
        Column::Authors,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Title => "title",
            Column::Summary => "summary",
            Column::Time => "time",
            Column::Comment => "comment",
            Column::Category => "category",
            Column::Authors => "authors",
        }
    }

    pub(crate) fn field(self, record: &Record) -> &str {
        match self {
            Column::Id => &record.id,
            Column::Title => &record.title,
            Column::Summary => &record.summary,
            Column::Time => &record.published,
            Column::Comment => &record.comment,
            Column::Category => &record.category,
            Column::Authors => &record.authors,
        }
    }
}
