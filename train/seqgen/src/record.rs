use serde::Serialize;

/// One labels.jsonl line per generated image.
#[derive(Serialize, Debug)]
pub struct JsonRecord<'a> {
    pub schema: &'static str,
    pub image: String,
    pub digits: &'a str,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
}
