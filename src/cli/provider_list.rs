use std::io::{self, Write};
use std::path::Path;

use crate::core::config::Config;
use crate::core::keys::{locate_api_key, PROVIDERS};

/// Print every known provider with where its key comes from. The provider a
/// session would start with is marked `*`.
pub fn list_providers<W: Write>(config: &Config, keys_dir: &Path, out: &mut W) -> io::Result<()> {
    let rows: Vec<_> = PROVIDERS
        .iter()
        .map(|spec| (spec, locate_api_key(spec, keys_dir).map(|(_, source)| source)))
        .collect();

    let configured = config.default_provider.as_deref().and_then(|wanted| {
        rows.iter()
            .find(|(spec, source)| source.is_some() && spec.name.eq_ignore_ascii_case(wanted))
    });
    let default = configured
        .or_else(|| rows.iter().find(|(_, source)| source.is_some()))
        .map(|(spec, _)| spec.name);

    writeln!(out, "Providers:")?;
    for (spec, source) in &rows {
        let marker = if Some(spec.name) == default { "*" } else { " " };
        let status = match source {
            Some(source) => format!("key from {source}"),
            None if spec.required => format!("missing (required, set {})", spec.env_var),
            None => "not configured".to_string(),
        };
        writeln!(out, "  {:<10}{marker} {status}", spec.name)?;
    }
    if default.is_some() {
        writeln!(out, "\n* = default provider")?;
    }
    Ok(())
}
