use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use rentease::auth::{AuthContext, AuthError, Authenticator, UserId};
use rentease::workflows::documents::repository::DocumentRepository;
use rentease::workflows::documents::{Document, DocumentId, StorageError, StorageGateway};
use rentease::workflows::messaging::repository::MessageRepository;
use rentease::workflows::messaging::{Message, MessageId};
use rentease::workflows::notify::{
    DirectoryError, EmailMessage, MailError, Mailer, UserDirectory, UserProfile,
};
use rentease::workflows::rent::repository::{
    LeaseRepository, PaymentRepository, PropertyRepository,
};
use rentease::workflows::rent::{
    Lease, LeaseId, PaymentDue, PaymentId, PaymentStatus, Property, PropertyId,
};
use rentease::workflows::store::RepositoryError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    records: Arc<Mutex<HashMap<PropertyId, Property>>>,
    sequence: Arc<AtomicU64>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, mut property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if property.id.0.is_empty() {
            property.id = PropertyId(next_id(&self.sequence, "prop"));
        }
        if guard.contains_key(&property.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn owned_by(&self, landlord_id: &UserId) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut owned: Vec<Property> = guard
            .values()
            .filter(|property| property.landlord_id == *landlord_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(owned)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeaseRepository {
    records: Arc<Mutex<HashMap<LeaseId, Lease>>>,
    sequence: Arc<AtomicU64>,
}

impl LeaseRepository for InMemoryLeaseRepository {
    fn insert(&self, mut lease: Lease) -> Result<Lease, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if lease.id.0.is_empty() {
            lease.id = LeaseId(next_id(&self.sequence, "lease"));
        }
        if guard.contains_key(&lease.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(lease.id.clone(), lease.clone());
        Ok(lease)
    }

    fn fetch(&self, id: &LeaseId) -> Result<Option<Lease>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_tenant(&self, tenant_id: &UserId) -> Result<Vec<Lease>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut leases: Vec<Lease> = guard
            .values()
            .filter(|lease| lease.tenant_id == *tenant_id)
            .cloned()
            .collect();
        leases.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(leases)
    }

    fn for_property(&self, property_id: &PropertyId) -> Result<Vec<Lease>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut leases: Vec<Lease> = guard
            .values()
            .filter(|lease| lease.property_id == *property_id)
            .cloned()
            .collect();
        leases.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(leases)
    }

    fn active_between(
        &self,
        tenant_id: &UserId,
        property_id: &PropertyId,
    ) -> Result<Option<Lease>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|lease| {
                lease.is_active
                    && lease.tenant_id == *tenant_id
                    && lease.property_id == *property_id
            })
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPaymentRepository {
    records: Arc<Mutex<HashMap<PaymentId, PaymentDue>>>,
    sequence: Arc<AtomicU64>,
}

impl PaymentRepository for InMemoryPaymentRepository {
    fn insert_batch(
        &self,
        drafts: Vec<PaymentDue>,
    ) -> Result<Vec<PaymentDue>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let mut stored = Vec::with_capacity(drafts.len());
        for mut payment in drafts {
            if payment.id.0.is_empty() {
                payment.id = PaymentId(next_id(&self.sequence, "pay"));
            }
            if guard.contains_key(&payment.id) {
                return Err(RepositoryError::Conflict);
            }
            stored.push(payment);
        }
        for payment in &stored {
            guard.insert(payment.id.clone(), payment.clone());
        }
        Ok(stored)
    }

    fn fetch(&self, id: &PaymentId) -> Result<Option<PaymentDue>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, payment: PaymentDue) -> Result<PaymentDue, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&payment.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(payment.id.clone(), payment.clone());
        Ok(payment)
    }

    fn for_leases(&self, lease_ids: &[LeaseId]) -> Result<Vec<PaymentDue>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut payments: Vec<PaymentDue> = guard
            .values()
            .filter(|payment| lease_ids.contains(&payment.lease_id))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.due_date.cmp(&a.due_date));
        Ok(payments)
    }

    fn mark_overdue_before(&self, today: NaiveDate) -> Result<Vec<PaymentDue>, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let mut flipped = Vec::new();
        for payment in guard.values_mut() {
            if payment.status == PaymentStatus::Pending && payment.due_date < today {
                payment.status = PaymentStatus::Overdue;
                flipped.push(payment.clone());
            }
        }
        flipped.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(flipped)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMessageRepository {
    records: Arc<Mutex<HashMap<MessageId, Message>>>,
    sequence: Arc<AtomicU64>,
}

impl MessageRepository for InMemoryMessageRepository {
    fn insert(&self, mut message: Message) -> Result<Message, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if message.id.0.is_empty() {
            message.id = MessageId(next_id(&self.sequence, "msg"));
        }
        if guard.contains_key(&message.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(message.id.clone(), message.clone());
        Ok(message)
    }

    fn fetch(&self, id: &MessageId) -> Result<Option<Message>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&message.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(message.id.clone(), message.clone());
        Ok(message)
    }

    fn involving(&self, user: &UserId) -> Result<Vec<Message>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut history: Vec<Message> = guard
            .values()
            .filter(|message| message.sender_id == *user || message.receiver_id == *user)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(history)
    }

    fn between(
        &self,
        user: &UserId,
        other: &UserId,
        property: Option<&PropertyId>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut thread: Vec<Message> = guard
            .values()
            .filter(|message| {
                let pair = (message.sender_id == *user && message.receiver_id == *other)
                    || (message.sender_id == *other && message.receiver_id == *user);
                let scoped = match property {
                    Some(scope) => message.property_id.as_ref() == Some(scope),
                    None => true,
                };
                pair && scoped
            })
            .cloned()
            .collect();
        thread.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(thread)
    }

    fn unread_count(&self, user: &UserId) -> Result<usize, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|message| message.receiver_id == *user && !message.is_read)
            .count())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDocumentRepository {
    records: Arc<Mutex<HashMap<DocumentId, Document>>>,
    sequence: Arc<AtomicU64>,
}

impl DocumentRepository for InMemoryDocumentRepository {
    fn insert(&self, mut document: Document) -> Result<Document, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if document.id.0.is_empty() {
            document.id = DocumentId(next_id(&self.sequence, "doc"));
        }
        if guard.contains_key(&document.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(document.id.clone(), document.clone());
        Ok(document)
    }

    fn fetch(&self, id: &DocumentId) -> Result<Option<Document>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn list(
        &self,
        property: Option<&PropertyId>,
        lease: Option<&LeaseId>,
    ) -> Result<Vec<Document>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut documents: Vec<Document> = guard
            .values()
            .filter(|document| {
                let by_property = match property {
                    Some(scope) => document.property_id.as_ref() == Some(scope),
                    None => true,
                };
                let by_lease = match lease {
                    Some(scope) => document.lease_id.as_ref() == Some(scope),
                    None => true,
                };
                by_property && by_lease
            })
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(documents)
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    mime_type: String,
}

/// Bucket stand-in keyed by object path, handing out deterministic
/// pseudo-signed links.
#[derive(Default, Clone)]
pub(crate) struct InMemoryStorage {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl StorageGateway for InMemoryStorage {
    fn store(&self, key: &str, bytes: &[u8], mime_type: &str) -> Result<(), StorageError> {
        let mut guard = self.objects.lock().expect("storage mutex poisoned");
        guard.insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                mime_type: mime_type.to_string(),
            },
        );
        Ok(())
    }

    fn signed_url(&self, key: &str, expires_in_secs: u64) -> Result<String, StorageError> {
        let guard = self.objects.lock().expect("storage mutex poisoned");
        if !guard.contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!(
            "https://storage.rentease.app/{key}?expires_in={expires_in_secs}&signature=demo"
        ))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.objects.lock().expect("storage mutex poisoned");
        guard
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

impl InMemoryStorage {
    pub(crate) fn object(&self, key: &str) -> Option<(usize, String)> {
        let guard = self.objects.lock().expect("storage mutex poisoned");
        guard
            .get(key)
            .map(|object| (object.bytes.len(), object.mime_type.clone()))
    }
}

/// Mailer that records every message instead of talking to a provider.
#[derive(Default, Clone)]
pub(crate) struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    sequence: Arc<AtomicU64>,
}

impl Mailer for RecordingMailer {
    fn send(&self, message: EmailMessage) -> Result<String, MailError> {
        let mut guard = self.sent.lock().expect("mailer mutex poisoned");
        guard.push(message);
        Ok(next_id(&self.sequence, "email"))
    }
}

impl RecordingMailer {
    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl UserDirectory for InMemoryDirectory {
    fn profile(&self, user_id: &UserId) -> Result<UserProfile, DirectoryError> {
        let guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.get(user_id).cloned().ok_or(DirectoryError::NotFound)
    }
}

impl InMemoryDirectory {
    pub(crate) fn upsert(&self, profile: UserProfile) {
        let mut guard = self.profiles.lock().expect("directory mutex poisoned");
        guard.insert(profile.user_id.clone(), profile);
    }
}

/// Token verifier backed by a fixed token table, for development and demos.
#[derive(Default, Clone)]
pub(crate) struct StaticTokenAuthenticator {
    tokens: Arc<Mutex<HashMap<String, AuthContext>>>,
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let guard = self.tokens.lock().expect("token mutex poisoned");
        guard.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}

impl StaticTokenAuthenticator {
    pub(crate) fn register(&self, token: &str, context: AuthContext) {
        let mut guard = self.tokens.lock().expect("token mutex poisoned");
        guard.insert(token.to_string(), context);
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
