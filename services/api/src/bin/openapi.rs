//! services/api/src/bin/openapi.rs
//!
//! Dumps the booking API's OpenAPI document.
//!
//! Usage: `openapi [PATH]`. Writes `openapi.json` when no path is given and
//! prints to stdout when the path is `-`.

use api_lib::web::rest::ApiDoc;
use std::io::Write;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let target = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    let document = ApiDoc::openapi().to_pretty_json()?;

    if target == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.write_all(b"\n")?;
        return Ok(());
    }

    std::fs::write(&target, document)?;
    eprintln!("Wrote {} paths to {}", ApiDoc::openapi().paths.paths.len(), target);
    Ok(())
}
