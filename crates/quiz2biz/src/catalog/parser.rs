use serde::{Deserialize, Deserializer};
use std::io::Read;

/// Dimension sheet row: `key,display_name,weight[,order_index][,is_active]`.
#[derive(Debug, Deserialize)]
pub(crate) struct DimensionRow {
    pub(crate) key: String,
    pub(crate) display_name: String,
    pub(crate) weight: f64,
    #[serde(default)]
    pub(crate) order_index: Option<u32>,
    #[serde(default)]
    pub(crate) is_active: Option<bool>,
}

/// Question sheet row: `id,text,dimension_key,severity,coverage,answered,persona`.
#[derive(Debug, Deserialize)]
pub(crate) struct QuestionRow {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) dimension_key: Option<String>,
    #[serde(default)]
    pub(crate) severity: Option<f64>,
    #[serde(default)]
    pub(crate) coverage: Option<f64>,
    #[serde(default)]
    pub(crate) answered: Option<bool>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) persona: Option<String>,
}

pub(crate) fn parse_rows<R, T>(reader: R) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    csv_reader.deserialize::<T>().collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
