/// Strip the last extension from a file name: `"Song.final.mp3"` -> `"Song.final"`.
///
/// A trailing dot with nothing after it is left alone.
pub fn display_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            file_name[..dot].to_string()
        }
        _ => file_name.to_string(),
    }
}

/// Format seconds as `m:ss`. Non-finite and negative input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
