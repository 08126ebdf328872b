//! Shared test infrastructure: in-memory ports and profile builders used by
//! the orchestrator scenario tests.

use async_trait::async_trait;
use seqace_backup_core::app::AppController;
use seqace_backup_core::error::{BackupError, Result};
use seqace_backup_core::keychain::CredentialStore;
use seqace_backup_core::model::{ConnectionKind, Favorite, FavoritesDocument};
use seqace_backup_core::orchestrator::{BackupConfig, BackupOrchestrator, ClearPrompt};
use seqace_backup_core::repository::FavoritesRepository;
use seqace_backup_core::vault::{BACKUP_TITLE_PREFIX, VaultClient, VaultEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

/// In-memory credential store recording every lookup it receives.
#[derive(Default)]
pub struct MockCredentialStore {
    secrets: Mutex<BTreeMap<(String, String), String>>,
    pub lookups: Mutex<Vec<(String, String)>>,
    failing_accounts: Mutex<Vec<String>>,
}

impl MockCredentialStore {
    pub fn seed(&self, service: &str, account: &str, secret: &str) {
        self.secrets
            .lock()
            .unwrap()
            .insert((service.to_string(), account.to_string()), secret.to_string());
    }

    /// Make upserts for this account fail with a transport error.
    pub fn fail_upserts_for(&self, account: &str) {
        self.failing_accounts
            .lock()
            .unwrap()
            .push(account.to_string());
    }

    pub fn secret_count(&self) -> usize {
        self.secrets.lock().unwrap().len()
    }

    pub fn secret(&self, service: &str, account: &str) -> Option<String> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(service.to_string(), account.to_string()))
            .cloned()
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn tunnel_lookup_count(&self) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .filter(|(service, _)| service.contains("SSHTunnel"))
            .count()
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn lookup(&self, service: &str, account: &str) -> Result<Option<String>> {
        self.lookups
            .lock()
            .unwrap()
            .push((service.to_string(), account.to_string()));
        Ok(self.secret(service, account))
    }

    async fn upsert(
        &self,
        service: &str,
        account: &str,
        secret: &str,
        _allowed_callers: &[&str],
    ) -> Result<()> {
        if self
            .failing_accounts
            .lock()
            .unwrap()
            .iter()
            .any(|failing| failing == account)
        {
            return Err(BackupError::transport("security", "simulated failure"));
        }
        self.seed(service, account, secret);
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<bool> {
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .remove(&(service.to_string(), account.to_string()))
            .is_some())
    }
}

struct StoredDocument {
    id: String,
    title: String,
    body: String,
    created_at: String,
}

/// In-memory vault with title-keyed documents.
#[derive(Default)]
pub struct MockVault {
    documents: Mutex<Vec<StoredDocument>>,
    next_id: AtomicUsize,
    pub fail_create: AtomicBool,
}

impl MockVault {
    pub fn seed_document(&self, title: &str, body: &str, created_at: &str) {
        self.documents.lock().unwrap().push(StoredDocument {
            id: format!("seeded-{title}"),
            title: title.to_string(),
            body: body.to_string(),
            created_at: created_at.to_string(),
        });
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn body_of(&self, title: &str) -> Option<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|doc| doc.title == title)
            .map(|doc| doc.body.clone())
    }

    pub fn titles(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|doc| doc.title.clone())
            .collect()
    }
}

#[async_trait]
impl VaultClient for MockVault {
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn create_document(&self, title: &str, body: &str) -> Result<String> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BackupError::transport("op", "simulated create failure"));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let id = format!("item-{n}");
        self.documents.lock().unwrap().push(StoredDocument {
            id: id.clone(),
            title: title.to_string(),
            body: body.to_string(),
            created_at: format!("2024-06-01T00:00:{n:02}Z"),
        });
        Ok(id)
    }

    async fn get_document_body(&self, title: &str) -> Result<String> {
        self.body_of(title)
            .ok_or_else(|| BackupError::transport("op", format!("\"{title}\" isn't an item")))
    }

    async fn list_documents(&self) -> Result<Vec<VaultEntry>> {
        let mut entries: Vec<VaultEntry> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|doc| doc.title.starts_with(BACKUP_TITLE_PREFIX))
            .map(|doc| VaultEntry {
                id: doc.id.clone(),
                title: doc.title.clone(),
                created_at: doc.created_at.clone(),
            })
            .collect();
        entries.sort_by(|a, b| b.title.cmp(&a.title));
        Ok(entries)
    }
}

/// App controller that only counts quit requests.
#[derive(Default)]
pub struct MockApp {
    pub quit_requests: AtomicUsize,
}

#[async_trait]
impl AppController for MockApp {
    async fn request_quit(&self) {
        self.quit_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Prompt with pre-scripted answers, counting how often each gate fired.
pub struct ScriptedPrompt {
    pub accept_backup: bool,
    pub accept_delete: bool,
    pub backup_offers: AtomicUsize,
    pub delete_confirms: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(accept_backup: bool, accept_delete: bool) -> Self {
        Self {
            accept_backup,
            accept_delete,
            backup_offers: AtomicUsize::new(0),
            delete_confirms: AtomicUsize::new(0),
        }
    }
}

impl ClearPrompt for ScriptedPrompt {
    fn offer_backup(&self, _favorites: usize) -> Result<bool> {
        self.backup_offers.fetch_add(1, Ordering::SeqCst);
        Ok(self.accept_backup)
    }

    fn confirm_delete(&self, _favorites: usize) -> Result<bool> {
        self.delete_confirms.fetch_add(1, Ordering::SeqCst);
        Ok(self.accept_delete)
    }
}

/// Orchestrator wired to the mocks, with its favorites file in a tempdir.
pub struct Harness {
    pub dir: TempDir,
    pub credentials: Arc<MockCredentialStore>,
    pub vault: Arc<MockVault>,
    pub app: Arc<MockApp>,
    pub orchestrator: BackupOrchestrator,
}

impl Harness {
    pub fn new(document: Option<&FavoritesDocument>) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let favorites_path = dir.path().join("Favorites.plist");
        if let Some(document) = document {
            FavoritesRepository::new(&favorites_path)
                .write(document)
                .expect("seed favorites");
        }

        let credentials = Arc::new(MockCredentialStore::default());
        let vault = Arc::new(MockVault::default());
        let app = Arc::new(MockApp::default());

        let config = BackupConfig {
            vault: "Private".to_string(),
            favorites_path,
            client_binary: "/Applications/Sequel Ace.app/Contents/MacOS/Sequel Ace".to_string(),
        };
        let orchestrator = BackupOrchestrator::new(
            config,
            credentials.clone(),
            vault.clone(),
            app.clone(),
        );

        Self {
            dir,
            credentials,
            vault,
            app,
            orchestrator,
        }
    }

    pub fn repository(&self) -> FavoritesRepository {
        FavoritesRepository::new(self.dir.path().join("Favorites.plist"))
    }
}

pub fn standard_favorite(
    id: i64,
    name: &str,
    host: &str,
    user: &str,
    database: Option<&str>,
) -> Favorite {
    let mut favorite = Favorite::new(id, name);
    favorite.host = host.to_string();
    favorite.user = user.to_string();
    favorite.database = database.map(str::to_string);
    favorite
}

pub fn tunnel_favorite(
    id: i64,
    name: &str,
    host: &str,
    user: &str,
    ssh_user: &str,
    ssh_host: &str,
) -> Favorite {
    let mut favorite = standard_favorite(id, name, host, user, None);
    favorite.kind = ConnectionKind::SshTunnel;
    favorite.ssh_user = Some(ssh_user.to_string());
    favorite.ssh_host = Some(ssh_host.to_string());
    favorite
}

pub fn document(children: Vec<Favorite>) -> FavoritesDocument {
    let mut document = FavoritesDocument::empty();
    document.root.children = children;
    document
}
