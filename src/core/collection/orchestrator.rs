//! Collection orchestrator
//!
//! Drives one export run against one collection: opens the session, builds
//! the [`MetadataRecord`] from collection attributes and `metadata.xml`,
//! brackets the export with the remote open/close rules and puts the
//! collection into its initial export state.

use crate::adapters::repository::store::{AvuOutcome, MetadataStore};
use crate::adapters::repository::traits::{Collection, ConnectionSettings, Connector, Session};
use crate::core::state::{ExportStateMachine, ExporterState, TransitionOutcome, STATE_ATTRIBUTE};
use crate::core::xml::{parse_document, parse_record_fields, Element};
use crate::domain::errors::{ExporterError, RepositoryError};
use crate::domain::ids::{CollectionPath, RepositoryName};
use crate::domain::metadata::{MetadataRecord, DEFAULT_ATTRIBUTE_PREFIX};
use crate::domain::Result;
use chrono::{DateTime, Utc};
use std::io::Read;
use tracing::Span;
use uuid::Uuid;

/// Default name of the descriptive document inside a collection
pub const DEFAULT_METADATA_DOCUMENT: &str = "metadata.xml";

/// User attribute holding the email address
pub const EMAIL_ATTRIBUTE: &str = "email";

/// Options for reading a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareOptions {
    /// Data object parsed as `metadata.xml`
    pub metadata_document: String,

    /// Namespace prefix stripped from attribute names
    pub attribute_prefix: String,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            metadata_document: DEFAULT_METADATA_DOCUMENT.to_string(),
            attribute_prefix: DEFAULT_ATTRIBUTE_PREFIX.to_string(),
        }
    }
}

/// Orchestrates the preparation and cleanup of one collection export
pub struct CollectionOrchestrator {
    connector: Box<dyn Connector>,
    settings: ConnectionSettings,
    options: PrepareOptions,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    span: Span,
    session: Option<Box<dyn Session>>,
    collection: Option<Box<dyn Collection>>,
    repository: Option<RepositoryName>,
    record: MetadataRecord,
}

impl CollectionOrchestrator {
    /// Creates an orchestrator; nothing is opened until [`connect`](Self::connect)
    pub fn new(connector: Box<dyn Connector>, settings: ConnectionSettings) -> Self {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "export_run",
            run_id = %run_id,
            repository = tracing::field::Empty,
            collection = tracing::field::Empty,
        );

        Self {
            connector,
            settings,
            options: PrepareOptions::default(),
            run_id,
            started_at: Utc::now(),
            span,
            session: None,
            collection: None,
            repository: None,
            record: MetadataRecord::new(),
        }
    }

    /// Replaces the default options
    pub fn with_options(mut self, options: PrepareOptions) -> Self {
        self.options = options;
        self
    }

    /// Identifier of this run, recorded on every event
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// When this run started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The record built by the last successful read
    pub fn record(&self) -> &MetadataRecord {
        &self.record
    }

    /// Path of the fetched collection, if any
    pub fn collection_path(&self) -> Option<&CollectionPath> {
        self.collection.as_deref().map(|collection| collection.path())
    }

    /// Opens a session, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::ConnectionFailed`] when the repository
    /// cannot be reached.
    pub fn connect(&mut self) -> Result<()> {
        let _entered = self.span.enter();

        self.collection = None;
        self.session = None;

        let session = self.connector.connect(&self.settings)?;
        tracing::info!(
            host = %self.settings.host,
            port = self.settings.port,
            zone = %self.settings.zone,
            "Connected to repository"
        );
        self.session = Some(session);
        Ok(())
    }

    /// Connects if needed and fetches the collection handle
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be opened or the collection
    /// does not exist.
    pub fn open(&mut self, path: &CollectionPath) -> Result<()> {
        self.span.record("collection", path.as_str());

        if self.session.is_none() {
            self.connect()?;
        }

        let collection = self.session()?.collection(path)?;
        self.collection = Some(collection);
        Ok(())
    }

    /// Prepares a collection for export to `repository`
    ///
    /// Connects, fetches the collection, builds the metadata record, runs the
    /// remote open rule and initializes the export state. A failure leaves
    /// whatever was reached in place so that
    /// [`status_cleanup`](Self::status_cleanup) can undo it.
    ///
    /// # Errors
    ///
    /// Transport errors, a missing `date` element and a failed creator email
    /// lookup abort preparation.
    pub fn prepare(
        &mut self,
        path: &CollectionPath,
        repository: &RepositoryName,
    ) -> Result<&MetadataRecord> {
        self.span.record("repository", repository.as_str());
        self.repository = Some(repository.clone());

        self.connect()?;
        self.open(path)?;
        self.read_collection_metadata()?;

        let span = self.span.clone();
        let _entered = span.enter();

        let rules = self.session()?.rules(path);
        rules.open_collection()?;
        tracing::info!("Opened collection for export");

        self.state_machine(repository)?.initialize();
        tracing::info!(
            state = %ExporterState::CreateExporter,
            elapsed_ms = (Utc::now() - self.started_at).num_milliseconds(),
            "Collection prepared"
        );

        Ok(&self.record)
    }

    /// Builds the metadata record from the fetched collection
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if no collection was fetched,
    /// [`ExporterError::Lookup`] if the creator's email cannot be resolved
    /// and a parse error if `metadata.xml` is malformed or lacks `date`.
    pub fn read_collection_metadata(&mut self) -> Result<&MetadataRecord> {
        let _entered = self.span.enter();

        let session = self.session()?;
        let collection = self
            .collection
            .as_deref()
            .ok_or_else(|| ExporterError::State("No collection has been fetched".to_string()))?;

        let mut record = MetadataRecord::new();

        for avu in collection.metadata()? {
            if avu.name.eq_ignore_ascii_case(STATE_ATTRIBUTE) {
                continue;
            }
            record
                .attributes
                .set(&avu.name, &avu.value, &self.options.attribute_prefix);
        }

        record.creator_email = Some(lookup_email(session, record.creator())?);

        let root = read_document(collection, &self.options.metadata_document)?;
        parse_record_fields(&root, &mut record)?;

        tracing::info!(
            attributes = record.attributes.extra.len(),
            document = %self.options.metadata_document,
            "Read collection metadata"
        );

        self.record = record;
        Ok(&self.record)
    }

    /// Moves the prepared repository from `old` to `new`
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if [`prepare`](Self::prepare) has not
    /// fetched a collection yet.
    pub fn update_status(
        &self,
        old: Option<ExporterState>,
        new: Option<ExporterState>,
    ) -> Result<TransitionOutcome> {
        let repository = self
            .repository
            .as_ref()
            .ok_or_else(|| ExporterError::State("No repository has been prepared".to_string()))?;
        Ok(self.state_machine(repository)?.transition(old, new))
    }

    /// Attaches an arbitrary AVU to the collection
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if no collection was fetched.
    pub fn add_metadata(&self, key: &str, value: &str, unit: Option<&str>) -> Result<AvuOutcome> {
        Ok(self.store()?.add(key, value, unit))
    }

    /// Detaches an AVU from the collection
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if no collection was fetched.
    pub fn remove_metadata(&self, key: &str, value: &str) -> Result<AvuOutcome> {
        Ok(self.store()?.remove(key, value))
    }

    /// Crash path: removes every export tag of `repository` and closes the
    /// collection
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if no collection handle was fetched,
    /// or the error of the remote close rule.
    pub fn status_cleanup(&self, repository: &RepositoryName) -> Result<()> {
        self.span.record("repository", repository.as_str());

        let collection = self.collection.as_deref().ok_or_else(|| {
            ExporterError::State("Cannot clean up: no collection has been fetched".to_string())
        })?;
        let rules = self.session()?.rules(collection.path());

        self.state_machine(repository)?
            .cleanup_on_crash(rules.as_ref())
    }

    /// Export states of `repository` currently attached to the collection
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::State`] if no collection was fetched.
    pub fn status(&self, repository: &RepositoryName) -> Result<Vec<ExporterState>> {
        self.state_machine(repository)?.active_states()
    }

    fn session(&self) -> Result<&dyn Session> {
        self.session
            .as_deref()
            .ok_or_else(|| RepositoryError::NotConnected.into())
    }

    fn store(&self) -> Result<MetadataStore<'_>> {
        let collection = self
            .collection
            .as_deref()
            .ok_or_else(|| ExporterError::State("No collection has been fetched".to_string()))?;
        Ok(MetadataStore::new(collection, self.span.clone()))
    }

    fn state_machine(&self, repository: &RepositoryName) -> Result<ExportStateMachine<'_>> {
        Ok(ExportStateMachine::new(self.store()?, repository.clone()))
    }
}

/// Resolves the email address of the creating user
fn lookup_email(session: &dyn Session, creator: Option<&str>) -> Result<String> {
    let creator = creator.ok_or_else(|| {
        ExporterError::Lookup("Collection has no creator attribute".to_string())
    })?;

    let user = session.user(creator).map_err(|e| match e {
        RepositoryError::UserNotFound(name) => {
            ExporterError::Lookup(format!("Creator {name} is not a known user"))
        }
        other => ExporterError::Repository(other),
    })?;

    user.get_one(EMAIL_ATTRIBUTE)
        .map(str::to_string)
        .ok_or_else(|| ExporterError::Lookup(format!("User {creator} has no email attribute")))
}

/// Reads and parses a document; the stream is released before parsing
fn read_document(collection: &dyn Collection, name: &str) -> Result<Element> {
    let mut bytes = Vec::new();
    {
        let mut reader = collection.open_document(name)?;
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| RepositoryError::Io(e.to_string()))?;
    }
    Ok(parse_document(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::repository::memory::MemoryRepository;
    use crate::adapters::repository::traits::{CLOSE_COLLECTION_RULE, OPEN_COLLECTION_RULE};
    use crate::domain::avu::{Avu, UserProfile};
    use crate::domain::errors::ParseError;
    use crate::domain::metadata::TaggedField;

    const METADATA_XML: &str = r#"<?xml version="1.0"?>
<metadata>
  <date>2018-11-20</date>
  <description>Liver biopsies &amp; controls</description>
  <tissue id="UBERON:http://purl.obolibrary.org/obo/class:UBERON_0002107">liver</tissue>
  <technology/>
  <factors><factor>age</factor><factor>sex</factor></factors>
  <protocol><name>Biopsy</name><description>Needle</description></protocol>
  <contact><firstName>Jane</firstName><lastName>Doe</lastName></contact>
  <article>https://doi.org/10.1000/1</article>
</metadata>"#;

    fn path() -> CollectionPath {
        CollectionPath::new("/nlmumc/projects/P000000001/C000000001").unwrap()
    }

    fn repository() -> RepositoryName {
        RepositoryName::new("Dataverse").unwrap()
    }

    fn setup(avus: Vec<Avu>, document: Option<&str>) -> MemoryRepository {
        let repo = MemoryRepository::new();
        let mut all = vec![
            Avu::new("dcat:title", "Liver study"),
            Avu::new("creator", "jdoe"),
        ];
        all.extend(avus);
        repo.add_collection(&path(), all);
        if let Some(document) = document {
            repo.add_document(&path(), DEFAULT_METADATA_DOCUMENT, document);
        }
        repo.add_user(UserProfile {
            name: "jdoe".to_string(),
            metadata: vec![Avu::new("email", "j.doe@example.org")],
        });
        repo
    }

    fn orchestrator(repo: &MemoryRepository) -> CollectionOrchestrator {
        CollectionOrchestrator::new(Box::new(repo.clone()), MemoryRepository::settings())
    }

    fn state_values(repo: &MemoryRepository) -> Vec<String> {
        repo.avus(&path())
            .into_iter()
            .filter(|avu| avu.name == STATE_ATTRIBUTE)
            .map(|avu| avu.value)
            .collect()
    }

    #[test]
    fn test_prepare_builds_record() {
        let repo = setup(vec![], Some(METADATA_XML));
        let mut orchestrator = orchestrator(&repo);

        let record = orchestrator.prepare(&path(), &repository()).unwrap();
        assert_eq!(record.attributes.title.as_deref(), Some("Liver study"));
        assert_eq!(record.creator_email.as_deref(), Some("j.doe@example.org"));
        assert_eq!(record.date.as_deref(), Some("2018-11-20"));
        assert_eq!(record.description.as_deref(), Some("Liver biopsies & controls"));
        assert_eq!(record.tissue.term().unwrap().vocabulary, "UBERON");
        assert_eq!(record.technology, TaggedField::Absent);
        assert_eq!(record.organism, TaggedField::Absent);
        assert_eq!(record.factors, vec!["age", "sex"]);
        assert_eq!(record.protocol[0]["name"], "Biopsy");
        assert_eq!(record.contact[0]["lastName"], "Doe");
        assert_eq!(record.articles, vec!["https://doi.org/10.1000/1"]);
    }

    #[test]
    fn test_prepare_resets_stale_state() {
        let repo = setup(
            vec![
                Avu::new(STATE_ATTRIBUTE, "Dataverse:upload-failed"),
                Avu::new(STATE_ATTRIBUTE, "Other:exported"),
            ],
            Some(METADATA_XML),
        );
        let mut orchestrator = orchestrator(&repo);

        orchestrator.prepare(&path(), &repository()).unwrap();

        assert_eq!(
            state_values(&repo),
            vec!["Other:exported", "Dataverse:create-exporter"]
        );
        let calls = repo.rule_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].rule, OPEN_COLLECTION_RULE);
        assert_eq!(
            orchestrator.status(&repository()).unwrap(),
            vec![ExporterState::CreateExporter]
        );
    }

    #[test]
    fn test_state_attribute_not_copied_into_record() {
        let repo = setup(
            vec![Avu::new("ExporterState", "Dataverse:finalize")],
            Some(METADATA_XML),
        );
        let mut orchestrator = orchestrator(&repo);

        let record = orchestrator.prepare(&path(), &repository()).unwrap();
        assert!(record.attributes.extra.is_empty());
    }

    #[test]
    fn test_missing_date_then_cleanup() {
        let repo = setup(
            vec![Avu::new(STATE_ATTRIBUTE, "Dataverse:zip-failed")],
            Some("<metadata><description>no date</description></metadata>"),
        );
        let mut orchestrator = orchestrator(&repo);

        let err = orchestrator.prepare(&path(), &repository()).unwrap_err();
        assert!(matches!(
            err,
            ExporterError::Parse(ParseError::ElementNotFound(_))
        ));
        // open rule never ran
        assert!(repo.rule_calls().is_empty());

        orchestrator.status_cleanup(&repository()).unwrap();
        assert!(state_values(&repo).is_empty());
        let calls = repo.rule_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].rule, CLOSE_COLLECTION_RULE);
    }

    #[test]
    fn test_missing_email_is_lookup_error() {
        let repo = setup(vec![], Some(METADATA_XML));
        repo.add_user(UserProfile {
            name: "jdoe".to_string(),
            metadata: vec![],
        });
        let mut orchestrator = orchestrator(&repo);

        let err = orchestrator.prepare(&path(), &repository()).unwrap_err();
        assert!(matches!(err, ExporterError::Lookup(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_unknown_creator_is_lookup_error() {
        let repo = setup(vec![Avu::new("creator", "ghost")], Some(METADATA_XML));
        let mut orchestrator = orchestrator(&repo);

        assert!(matches!(
            orchestrator.prepare(&path(), &repository()).unwrap_err(),
            ExporterError::Lookup(_)
        ));
    }

    #[test]
    fn test_missing_document() {
        let repo = setup(vec![], None);
        let mut orchestrator = orchestrator(&repo);

        assert!(matches!(
            orchestrator.prepare(&path(), &repository()).unwrap_err(),
            ExporterError::Repository(RepositoryError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_custom_document_name_and_prefix() {
        let repo = MemoryRepository::new();
        repo.add_collection(
            &path(),
            vec![
                Avu::new("schema:Title", "Custom"),
                Avu::new("creator", "jdoe"),
            ],
        );
        repo.add_document(&path(), "instance.xml", "<m><date>2021</date></m>");
        repo.add_user(UserProfile {
            name: "jdoe".to_string(),
            metadata: vec![Avu::new("email", "j@example.org")],
        });

        let mut orchestrator = orchestrator(&repo).with_options(PrepareOptions {
            metadata_document: "instance.xml".to_string(),
            attribute_prefix: "schema:".to_string(),
        });
        let record = orchestrator.prepare(&path(), &repository()).unwrap();
        assert_eq!(record.attributes.title.as_deref(), Some("Custom"));
        assert_eq!(record.date.as_deref(), Some("2021"));
    }

    #[test]
    fn test_connection_failure() {
        let repo = setup(vec![], Some(METADATA_XML));
        repo.fail_connections("refused");
        let mut orchestrator = orchestrator(&repo);

        let err = orchestrator.prepare(&path(), &repository()).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        // nothing was fetched, so there is nothing to clean up
        assert!(matches!(
            orchestrator.status_cleanup(&repository()).unwrap_err(),
            ExporterError::State(_)
        ));
    }

    #[test]
    fn test_open_rule_failure_propagates() {
        let repo = setup(vec![], Some(METADATA_XML));
        repo.fail_rule(OPEN_COLLECTION_RULE);
        let mut orchestrator = orchestrator(&repo);

        assert!(matches!(
            orchestrator.prepare(&path(), &repository()).unwrap_err(),
            ExporterError::Repository(RepositoryError::RuleFailed { .. })
        ));
        assert!(state_values(&repo).is_empty());
    }

    #[test]
    fn test_update_status_and_passthroughs() {
        let repo = setup(vec![], Some(METADATA_XML));
        let mut orchestrator = orchestrator(&repo);

        assert!(matches!(
            orchestrator.update_status(None, Some(ExporterState::Finalize)),
            Err(ExporterError::State(_))
        ));

        orchestrator.prepare(&path(), &repository()).unwrap();
        let outcome = orchestrator
            .update_status(
                Some(ExporterState::CreateExporter),
                Some(ExporterState::PrepareCollection),
            )
            .unwrap();
        assert!(outcome.added.is_applied());
        assert_eq!(state_values(&repo), vec!["Dataverse:prepare-collection"]);

        assert!(orchestrator
            .add_metadata("externalLink", "https://example.org/ds/1", None)
            .unwrap()
            .is_applied());
        assert!(matches!(
            orchestrator.remove_metadata("externalLink", "other").unwrap(),
            AvuOutcome::Rejected(_)
        ));
    }

    #[test]
    fn test_status_without_prepare() {
        let repo = setup(
            vec![Avu::new(STATE_ATTRIBUTE, "Dataverse:exported")],
            None,
        );
        let mut orchestrator = orchestrator(&repo);

        orchestrator.open(&path()).unwrap();
        assert_eq!(
            orchestrator.status(&repository()).unwrap(),
            vec![ExporterState::Exported]
        );
        assert_eq!(repo.connections(), 1);
    }
}
