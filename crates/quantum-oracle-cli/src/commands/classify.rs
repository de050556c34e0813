use quantum_oracle_core::{ClassificationRequest, Reading};

use crate::render::render_reading;

pub fn run(bytes: &[u8], request: ClassificationRequest, json: bool) -> anyhow::Result<()> {
    super::validate_request(&request)?;
    let reading = Reading::from_samples("command-line", None, 0, request, bytes.to_vec());

    if json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        print!("{}", render_reading(&reading));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_accepts_valid_input() {
        assert!(run(&[0, 128, 255], ClassificationRequest::new(3, 0, 100), true).is_ok());
    }

    #[test]
    fn classify_rejects_inverted_bounds() {
        assert!(run(&[1], ClassificationRequest::new(1, 9, 0), false).is_err());
    }
}
