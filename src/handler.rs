use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams,
    DidChangeWatchedFilesRegistrationOptions, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, FileSystemWatcher, GlobPattern, GotoDefinitionParams,
    GotoDefinitionResponse, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, MessageType, OneOf, Registration, ServerCapabilities,
    ServerInfo, TextDocumentSyncCapability, TextDocumentSyncKind, Url,
};
use tower_lsp::{Client, LanguageServer, LspService, Server};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::index::CssIndex;
use crate::providers::{self, AttributePattern, CompletionResolveTable, TextDocument};
use crate::watcher::{FileChangeEvent, FileChangeType, FileWatchers};

/// Language server composing the index, the watchers and the providers
///
/// Owns the single [`CssIndex`] instance; `shutdown` clears it.
pub struct StyleNameServer {
    client: Client,
    engine: Arc<CssIndex>,
    config: Arc<RwLock<Config>>,
    attribute: Arc<RwLock<AttributePattern>>,
    documents: Arc<RwLock<HashMap<Url, TextDocument>>>,
    watchers: Arc<Mutex<Option<FileWatchers>>>,
    resolve_table: Arc<CompletionResolveTable>,
    workspace_root: Arc<RwLock<Option<PathBuf>>>,
}

impl StyleNameServer {
    pub fn new(client: Client) -> Self {
        let config = Config::default();
        Self {
            client,
            engine: Arc::new(CssIndex::new(config.debounce())),
            attribute: Arc::new(RwLock::new(AttributePattern::new(&config.attribute_name))),
            config: Arc::new(RwLock::new(config)),
            documents: Arc::new(RwLock::new(HashMap::new())),
            watchers: Arc::new(Mutex::new(None)),
            resolve_table: Arc::new(CompletionResolveTable::new()),
            workspace_root: Arc::new(RwLock::new(None)),
        }
    }

    pub fn engine(&self) -> &Arc<CssIndex> {
        &self.engine
    }

    async fn is_component(&self, uri: &Url) -> bool {
        let Ok(path) = uri.to_file_path() else {
            return false;
        };
        let config = self.config.read().await;
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| config.is_component_extension(ext))
    }

    async fn document(&self, uri: &Url) -> Option<TextDocument> {
        self.documents.read().await.get(uri).cloned()
    }

    async fn store_document(&self, uri: Url, text: String, version: i32) -> Option<TextDocument> {
        if !self.is_component(&uri).await {
            return None;
        }
        let path = uri.to_file_path().ok()?;
        let document = TextDocument::new(path, text, version);
        self.documents
            .write()
            .await
            .insert(uri, document.clone());
        Some(document)
    }

    async fn publish_diagnostics(&self, uri: Url, document: &TextDocument) {
        let (enabled, severity) = {
            let config = self.config.read().await;
            (config.diagnostics, config.diagnostic_severity)
        };
        if !enabled {
            return;
        }
        let attribute = self.attribute().await;

        let diagnostics =
            providers::diagnostics::diagnostics(&self.engine, document, &attribute, severity).await;
        debug!(
            "Publishing {} diagnostic(s) for {}",
            diagnostics.len(),
            uri
        );
        self.client
            .publish_diagnostics(uri, diagnostics, Some(document.version()))
            .await;
    }

    async fn attribute(&self) -> AttributePattern {
        self.attribute.read().await.clone()
    }

    /// Ask the editor to forward file events when we are not watching natively
    async fn register_forwarded_watchers(&self, globs: Vec<String>) {
        let options = DidChangeWatchedFilesRegistrationOptions {
            watchers: globs
                .into_iter()
                .map(|glob| FileSystemWatcher {
                    glob_pattern: GlobPattern::String(glob),
                    kind: None,
                })
                .collect(),
        };
        let register_options = match serde_json::to_value(options) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to encode watcher registration: {}", e);
                return;
            }
        };

        let registration = Registration {
            id: "stylename-watched-files".to_string(),
            method: "workspace/didChangeWatchedFiles".to_string(),
            register_options: Some(register_options),
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            warn!("Editor refused file watcher registration: {}", e);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for StyleNameServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri.clone())
            .and_then(|uri| uri.to_file_path().ok());

        let mut config = match &root {
            Some(root) => Config::load(root).unwrap_or_else(|e| {
                warn!("{:#}; using defaults", e);
                Config::default()
            }),
            None => Config::default(),
        };
        if let Some(options) = &params.initialization_options {
            match config.merge_json(options) {
                Ok(merged) => config = merged,
                Err(e) => warn!("{:#}; ignoring initializationOptions", e),
            }
        }

        self.engine.set_debounce(config.debounce());
        info!(
            "Initializing for {} (attribute {:?})",
            root.as_ref()
                .map(|r| r.display().to_string())
                .unwrap_or_else(|| "<no workspace>".to_string()),
            config.attribute_name
        );
        *self.attribute.write().await = AttributePattern::new(&config.attribute_name);
        *self.config.write().await = config;
        *self.workspace_root.write().await = root;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "stylename".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(vec![
                        "\"".to_string(),
                        "'".to_string(),
                        " ".to_string(),
                    ]),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                definition_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let config = self.config.read().await.clone();
        let root = self.workspace_root.read().await.clone();

        let watchers = match (&root, config.watch) {
            (Some(root), true) => FileWatchers::setup(self.engine.clone(), root, &config),
            _ => FileWatchers::new(self.engine.clone(), &config),
        };

        match watchers {
            Ok(watchers) => {
                if !watchers.is_watching() {
                    self.register_forwarded_watchers(watchers.filter().watch_globs())
                        .await;
                }
                *self.watchers.lock().await = Some(watchers);
            }
            Err(e) => {
                error!("Failed to set up file watchers: {:#}", e);
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("stylename: file watching disabled ({})", e),
                    )
                    .await;
            }
        }
        info!("stylename server ready");
    }

    async fn shutdown(&self) -> Result<()> {
        if let Some(mut watchers) = self.watchers.lock().await.take() {
            watchers.dispose();
        }
        self.engine.clear();
        self.resolve_table.clear();
        self.documents.write().await.clear();
        info!("stylename server shut down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        if let Some(document) = self
            .store_document(doc.uri.clone(), doc.text, doc.version)
            .await
        {
            self.publish_diagnostics(doc.uri, &document).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let uri = params.text_document.uri;
        if let Some(document) = self
            .store_document(uri.clone(), change.text, params.text_document.version)
            .await
        {
            self.publish_diagnostics(uri, &document).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        if self.documents.write().await.remove(&uri).is_some() {
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        let watchers = self.watchers.lock().await;
        let Some(watchers) = watchers.as_ref() else {
            return;
        };

        for change in params.changes {
            let Ok(path) = change.uri.to_file_path() else {
                continue;
            };
            let change_type = match change.typ {
                tower_lsp::lsp_types::FileChangeType::CREATED => FileChangeType::Created,
                tower_lsp::lsp_types::FileChangeType::CHANGED => FileChangeType::Modified,
                tower_lsp::lsp_types::FileChangeType::DELETED => FileChangeType::Deleted,
                other => {
                    debug!("Ignoring file change type {:?}", other);
                    continue;
                }
            };
            watchers.dispatch(FileChangeEvent::new(path, change_type));
        }
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position.position;
        let Some(document) = self
            .document(&params.text_document_position.text_document.uri)
            .await
        else {
            return Ok(None);
        };

        let attribute = self.attribute().await;
        let items = providers::completion::complete(
            &self.engine,
            &document,
            position,
            &attribute,
            &self.resolve_table,
        )
        .await;
        Ok(items.map(CompletionResponse::Array))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> Result<CompletionItem> {
        Ok(providers::completion::resolve(
            &self.engine,
            item,
            &self.resolve_table,
        ))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let Some(document) = self
            .document(&params.text_document_position_params.text_document.uri)
            .await
        else {
            return Ok(None);
        };

        let attribute = self.attribute().await;
        Ok(providers::hover::hover(&self.engine, &document, position, &attribute).await)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params.position;
        let Some(document) = self
            .document(&params.text_document_position_params.text_document.uri)
            .await
        else {
            return Ok(None);
        };

        let attribute = self.attribute().await;
        Ok(
            providers::definition::definition(&self.engine, &document, position, &attribute)
                .await
                .map(GotoDefinitionResponse::Scalar),
        )
    }
}

/// Serve LSP over stdin/stdout until the client disconnects
pub async fn serve_stdio() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(StyleNameServer::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
