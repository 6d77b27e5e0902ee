use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// `data:<mime>;base64,<payload>` as accepted by the image host
pub fn to_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
