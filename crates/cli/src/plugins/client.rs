//! HTTP client plugins. Both declare one shared `client` instance that the
//! SDK functions call through.

use specgen_core::PluginDefinition;
use specgen_core::naming::{CaseStyle, IdentifierRequest, Namespace};

use super::ts::escape_string;
use super::{
    CLIENT_AXIOS, CLIENT_FETCH, CLIENT_REF, CLIENT_TAG, Plugin, PluginRun, declaration_id,
    import_id,
};

/// Client built on `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchClient;

/// Client built on `axios`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxiosClient;

impl Plugin for FetchClient {
    fn name(&self) -> &'static str {
        CLIENT_FETCH
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(CLIENT_FETCH).tagged(CLIENT_TAG)
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        declare_client(run, CLIENT_FETCH, "baseUrl")
    }
}

impl Plugin for AxiosClient {
    fn name(&self) -> &'static str {
        CLIENT_AXIOS
    }

    fn definition(&self) -> PluginDefinition {
        PluginDefinition::new(CLIENT_AXIOS).tagged(CLIENT_TAG)
    }

    fn generate(&self, run: &mut PluginRun<'_>) -> Result<(), String> {
        declare_client(run, CLIENT_AXIOS, "baseURL")
    }
}

/// `baseUrl` config wins over the document's first server.
fn declare_client(run: &mut PluginRun<'_>, module: &str, base_url_key: &str) -> Result<(), String> {
    let import = import_id(module);
    run.declare(
        import.clone(),
        format!("import {{ createClient }} from '{module}';"),
        Vec::<String>::new(),
    );

    let name = run.name(IdentifierRequest::new(CLIENT_REF, Namespace::Value).case(CaseStyle::Camel))?;
    let base_url = run
        .config_str("baseUrl")
        .or_else(|| run.document.base_url())
        .map(|url| format!("{{ {base_url_key}: '{}' }}", escape_string(url)))
        .unwrap_or_default();
    run.declare(
        declaration_id(Namespace::Value, CLIENT_REF),
        format!("export const {name} = createClient({base_url});"),
        [import],
    );
    Ok(())
}
