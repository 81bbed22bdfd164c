//! The action orchestrator.
//!
//! A [`Client`] pairs a [`Transport`] with a [`Store`] and exposes one
//! method per action. Each action is a single request/response cycle:
//! build the path, issue the request, normalize the response, mutate the
//! store, resolve relationships on the returned data. Store mutation
//! happens synchronously between suspension points, so concurrent actions
//! interleave at whole-response granularity (last write wins).

use crate::error::Result;
use crate::status::StatusCounter;
use crate::transport::Transport;
use jsonapi_engine::{
    clean_patch, denormalize, normalize_document, normalize_included, parse_document, resolve,
    resolve_data, Config, Data, Error as EngineError, Record, RecordId, RelData, Store, Target,
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-request overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Replace the computed request path entirely.
    pub url: Option<String>,
    /// Query parameters appended to the request.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn query(query: Vec<(String, String)>) -> Self {
        Self {
            url: None,
            query,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Verb {
    Post,
    Patch,
    Delete,
}

impl Verb {
    fn as_str(self) -> &'static str {
        match self {
            Verb::Post => "post",
            Verb::Patch => "patch",
            Verb::Delete => "delete",
        }
    }
}

/// A store-backed client for servers speaking the JSON:API convention.
pub struct Client {
    transport: Arc<dyn Transport>,
    config: Config,
    store: RwLock<Store>,
    status: StatusCounter,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Bind a config snapshot at construction; it stays immutable for the
    /// client's lifetime.
    pub fn with_config(transport: Arc<dyn Transport>, config: Config) -> Self {
        let status = StatusCounter::new(config.max_status_id);
        Self {
            transport,
            config,
            store: RwLock::new(Store::new()),
            status,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A snapshot of the current store.
    pub fn store(&self) -> Store {
        self.store.read().clone()
    }

    /// Read one record from the store, with relationships resolved.
    pub fn record(&self, target: impl Into<Target>) -> Result<Option<Record>> {
        let (ty, id) = target.into().key_required()?;
        let store = self.store.read();
        Ok(store.get(&ty, &id).cloned().map(|mut record| {
            resolve(&mut record, &store, &self.config);
            record
        }))
    }

    /// Read a type's collection from the store, with relationships
    /// resolved on each member.
    pub fn collection(&self, ty: &str) -> HashMap<RecordId, Record> {
        let store = self.store.read();
        store
            .collection(ty)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|(id, mut record)| {
                resolve(&mut record, &store, &self.config);
                (id, record)
            })
            .collect()
    }

    /// Fetch a record or collection and write it into the store.
    pub async fn get(&self, target: impl Into<Target>) -> Result<Data> {
        self.get_with(target, RequestOptions::default()).await
    }

    pub async fn get_with(&self, target: impl Into<Target>, opts: RequestOptions) -> Result<Data> {
        let target = target.into();
        let path = action_path(&target, opts.url.as_deref())?;
        let sid = self.status.next_id();
        debug!(status = sid, path = %path, "get");

        // clear_on_update prunes only collection requests; the pruned type
        // comes from the target, not the payload, so an empty collection
        // can still clear it.
        let clear_ty = self
            .config
            .clear_on_update
            .then(|| target.key().ok())
            .flatten()
            .and_then(|(ty, id)| id.is_none().then_some(ty));

        let response = self.transport.get(&path, &opts.query).await?;
        let Some(body) = response.data else {
            return Ok(Data::Empty { json: None });
        };

        let doc = parse_document(body)?;
        let mut data = normalize_document(&doc, &self.config);
        let included = normalize_included(&doc);

        let mut store = self.store.write();
        store.merge_records(included);
        store.add_records(data.clone().into_records(), &self.config);

        if let Some(ty) = clear_ty {
            if data.single().is_none() {
                let keep: HashMap<RecordId, Record> = store
                    .collection(&ty)
                    .map(|collection| {
                        collection
                            .iter()
                            .filter(|(id, _)| data.get(id).is_some())
                            .map(|(id, record)| (id.clone(), record.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                store.clear_records(&ty, keep);
            }
        }

        if self.config.follow_relationships_data {
            resolve_data(&mut data, &store, &self.config);
        }
        Ok(data)
    }

    /// POST a new record to its type's collection path.
    pub async fn create(&self, record: &Record) -> Result<Record> {
        self.create_with(record, RequestOptions::default()).await
    }

    pub async fn create_with(&self, record: &Record, opts: RequestOptions) -> Result<Record> {
        let (ty, _) = Target::from(record).key()?;
        let path = opts.url.unwrap_or(ty);
        let sid = self.status.next_id();
        debug!(status = sid, path = %path, "create");

        let body = json!({ "data": denormalize(record) });
        let response = self.transport.post(&path, &body).await?;
        match response.data {
            Some(body) => self.write_back(body, record),
            None => {
                let mut stored = record.clone();
                // No server echo: the request payload becomes the stored
                // copy, under a synthetic id if it had none.
                if stored.tag.id.is_none() {
                    stored.tag.id = Some(format!("status-{sid}"));
                }
                let mut store = self.store.write();
                store.add_records([stored.clone()], &self.config);
                Ok(stored)
            }
        }
    }

    /// PATCH an existing record (id required).
    pub async fn update(&self, record: &Record) -> Result<Record> {
        self.update_with(record, RequestOptions::default()).await
    }

    pub async fn update_with(&self, record: &Record, opts: RequestOptions) -> Result<Record> {
        let target = Target::from(record);
        let (ty, id) = target.key_required()?;
        let path = action_path(&target, opts.url.as_deref())?;
        let sid = self.status.next_id();
        debug!(status = sid, path = %path, "update");

        let payload = if self.config.clean_patch {
            let store = self.store.read();
            clean_patch(record, Some(&store), &self.config.clean_patch_props)
        } else {
            record.clone()
        };
        let body = json!({ "data": denormalize(&payload) });

        let response = self.transport.patch(&path, &body).await?;
        match response.data {
            Some(body) => self.write_back(body, record),
            None => {
                let mut store = self.store.write();
                store.merge_records([record.clone()]);
                let mut stored = store
                    .get(&ty, &id)
                    .cloned()
                    .unwrap_or_else(|| record.clone());
                if self.config.follow_relationships_data {
                    resolve(&mut stored, &store, &self.config);
                }
                Ok(stored)
            }
        }
    }

    /// DELETE a record (id required) and remove it from the store. A
    /// response body, if the server sends one, is normalized and returned
    /// but not stored.
    pub async fn delete(&self, target: impl Into<Target>) -> Result<Option<Data>> {
        self.delete_with(target, RequestOptions::default()).await
    }

    pub async fn delete_with(
        &self,
        target: impl Into<Target>,
        opts: RequestOptions,
    ) -> Result<Option<Data>> {
        let target = target.into();
        target.key_required()?;
        let path = action_path(&target, opts.url.as_deref())?;
        let sid = self.status.next_id();
        debug!(status = sid, path = %path, "delete");

        let response = self.transport.delete(&path, None).await?;
        self.store.write().delete_record(&target)?;

        match response.data {
            Some(body) => {
                let doc = parse_document(body)?;
                let mut data = normalize_document(&doc, &self.config);
                if self.config.follow_relationships_data {
                    let store = self.store.read();
                    resolve_data(&mut data, &store, &self.config);
                }
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Fetch every record referenced by the target's relationship
    /// declarations, one GET per reference, each written into the store.
    ///
    /// A target without declarations (a path or bare ident) is fetched
    /// first to obtain them.
    pub async fn get_related(&self, target: impl Into<Target>) -> Result<HashMap<String, Data>> {
        let target = target.into();
        let (ty, id) = target.key_required()?;
        let sid = self.status.next_id();
        debug!(status = sid, ty = %ty, id = %id, "get related");

        let declared = target
            .record()
            .and_then(|record| record.tag.relationships.clone())
            .filter(|rels| !rels.is_empty());
        let relationships = match declared {
            Some(rels) => rels,
            None => {
                let fetched = self.get(format!("{ty}/{id}")).await?;
                fetched
                    .single()
                    .and_then(|record| record.tag.relationships.clone())
                    .filter(|rels| !rels.is_empty())
                    .ok_or_else(|| EngineError::MissingRelationships {
                        ty: ty.clone(),
                        id: id.clone(),
                    })?
            }
        };

        let mut related = HashMap::new();
        for (name, rel) in relationships.iter() {
            let resolved = match &rel.data {
                // Links-only declaration: nothing to follow.
                None => continue,
                Some(RelData::Empty {}) => Data::Empty { json: None },
                Some(RelData::One(ident)) => self.get(ident.path()).await?,
                Some(RelData::Many(idents)) => {
                    let mut records = HashMap::with_capacity(idents.len());
                    for ident in idents {
                        let data = self.get(ident.path()).await?;
                        let record = data
                            .single()
                            .cloned()
                            .unwrap_or_else(|| Record::stub(&ident.ty, &ident.id));
                        records.insert(ident.id.clone(), record);
                    }
                    Data::Many {
                        records,
                        json: None,
                    }
                }
            };
            related.insert(name.to_string(), resolved);
        }
        Ok(related)
    }

    /// POST the record's relationship declarations, one call per
    /// relationship in declaration order, then refresh the owning record.
    pub async fn post_related(&self, record: &Record) -> Result<Data> {
        self.write_related(record, Verb::Post).await
    }

    /// PATCH the record's relationship declarations; see [`post_related`].
    ///
    /// [`post_related`]: Client::post_related
    pub async fn patch_related(&self, record: &Record) -> Result<Data> {
        self.write_related(record, Verb::Patch).await
    }

    /// DELETE the record's relationship declarations; see [`post_related`].
    ///
    /// [`post_related`]: Client::post_related
    pub async fn delete_related(&self, record: &Record) -> Result<Data> {
        self.write_related(record, Verb::Delete).await
    }

    async fn write_related(&self, record: &Record, verb: Verb) -> Result<Data> {
        let (ty, id) = Target::from(record).key_required()?;
        let relationships = record
            .tag
            .relationships
            .clone()
            .filter(|rels| !rels.is_empty())
            .ok_or_else(|| EngineError::MissingRelationships {
                ty: ty.clone(),
                id: id.clone(),
            })?;

        let sid = self.status.next_id();
        // Sequential, in declaration order. A failure aborts the remaining
        // calls and the refresh; completed calls are not rolled back.
        for (name, rel) in relationships.iter() {
            let path = format!("{ty}/{id}/relationships/{name}");
            let body = json!({ "data": rel.data });
            debug!(status = sid, verb = verb.as_str(), path = %path, "write related");
            match verb {
                Verb::Post => self.transport.post(&path, &body).await?,
                Verb::Patch => self.transport.patch(&path, &body).await?,
                Verb::Delete => self.transport.delete(&path, Some(&body)).await?,
            };
        }

        let mut opts = RequestOptions::default();
        if self.config.related_includes {
            opts.query
                .push(("include".to_string(), relationships.names().join(",")));
        }
        self.get_with(format!("{ty}/{id}"), opts).await
    }

    /// Write a create/update response body into the store and return the
    /// stored record.
    fn write_back(&self, body: Value, request: &Record) -> Result<Record> {
        let doc = parse_document(body)?;
        let data = normalize_document(&doc, &self.config);
        let included = normalize_included(&doc);

        let mut store = self.store.write();
        store.merge_records(included);
        store.add_records(data.clone().into_records(), &self.config);

        let mut record = match data {
            Data::One(record) => record,
            // Body without primary data: the request payload stands in.
            _ => {
                let stored = request.clone();
                if stored.tag.id.is_some() {
                    store.add_records([stored.clone()], &self.config);
                }
                stored
            }
        };
        if self.config.follow_relationships_data {
            resolve(&mut record, &store, &self.config);
        }
        Ok(record)
    }
}

/// Request path for a target: explicit override, then the record's `self`
/// link, then `type[/id]`.
fn action_path(target: &Target, url: Option<&str>) -> Result<String> {
    if let Some(url) = url {
        return Ok(url.to_string());
    }
    if let Some(link) = target.record().and_then(Record::self_link) {
        return Ok(link.to_string());
    }
    let (ty, id) = target.key()?;
    Ok(match id {
        Some(id) => format!("{ty}/{id}"),
        None => ty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_engine::RecordTag;
    use serde_json::json;

    fn widget(id: &str) -> Record {
        let mut tag = RecordTag::new("widget");
        tag.id = Some(id.into());
        Record::new(tag)
    }

    #[test]
    fn path_from_type_and_id() {
        let target = Target::from(("widget", "1"));
        assert_eq!(action_path(&target, None).unwrap(), "widget/1");
    }

    #[test]
    fn path_from_type_only() {
        let target = Target::from("widget");
        assert_eq!(action_path(&target, None).unwrap(), "widget");
    }

    #[test]
    fn self_link_beats_computed_path() {
        let mut record = widget("1");
        let mut links = serde_json::Map::new();
        links.insert("self".into(), json!("weirdPath/1"));
        record.tag.links = Some(links);

        let target = Target::from(record);
        assert_eq!(action_path(&target, None).unwrap(), "weirdPath/1");
    }

    #[test]
    fn url_override_beats_self_link() {
        let mut record = widget("1");
        let mut links = serde_json::Map::new();
        links.insert("self".into(), json!("weirdPath/1"));
        record.tag.links = Some(links);

        let target = Target::from(record);
        assert_eq!(
            action_path(&target, Some("custom/path")).unwrap(),
            "custom/path"
        );
    }

    #[test]
    fn path_requires_type() {
        let target = Target::from("");
        assert!(action_path(&target, None).is_err());
    }
}
