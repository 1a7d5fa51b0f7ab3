//! In-memory entity store. Every table is a `BTreeMap` keyed by an id drawn
//! from a per-table monotonic counter starting at 1; ids are never reused,
//! even after a delete. Nothing survives a restart. The store is constructed
//! once per process and shared through `AppState`; a single `RwLock` over all
//! tables keeps multi-entity operations (estimate submission, applying a
//! photo analysis) atomic without cross-lock ordering concerns.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Duration, Utc};
use thiserror::Error;

use crate::estimates;
use crate::models::{
    Customer, Estimate, EstimateItem, EstimateStatus, ItemKind, Job, JobStatus, Material,
    NewCustomer, NewEstimateItem, NewJob, NewNote, NewPhoto, Note, Photo, PhotoAnalysis, User,
};

/// storeSource placeholder for items created from a photo analysis before a
/// supplier has been chosen.
pub const PENDING_STORE_SELECTION: &str = "Pending selection";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        self.next_id += 1;
        let row = build(self.next_id);
        self.rows.insert(self.next_id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| keep(row)).cloned().collect()
    }

    fn update(&mut self, id: i64, apply: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        apply(row);
        Some(row.clone())
    }

    fn remove(&mut self, id: i64) -> Option<T> {
        self.rows.remove(&id)
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    customers: Table<Customer>,
    jobs: Table<Job>,
    photos: Table<Photo>,
    notes: Table<Note>,
    materials: Table<Material>,
    estimate_items: Table<EstimateItem>,
    estimates: Table<Estimate>,
}

impl Tables {
    fn items_for_job(&self, job_id: i64) -> Vec<EstimateItem> {
        self.estimate_items.filter(|item| item.job_id == job_id)
    }

    fn estimate_for_job(&self, job_id: i64) -> Option<Estimate> {
        self.estimates
            .rows
            .values()
            .find(|estimate| estimate.job_id == job_id)
            .cloned()
    }
}

/// Partial update for an estimate item. `store_source` distinguishes
/// "leave unchanged" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Default)]
pub struct EstimateItemPatch {
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub unit_price: Option<i64>,
    pub store_source: Option<Option<String>>,
}

/// Result of applying a photo analysis: the updated photo, the job's
/// estimate (created as a draft if it did not exist) and the placeholder
/// item created for the first identified part, if any.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub photo: Photo,
    pub estimate: Estimate,
    pub created_item: Option<EstimateItem>,
}

#[derive(Debug, Default)]
pub struct EntityStore {
    tables: RwLock<Tables>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with demo technicians, customers, jobs and the
    /// material catalog.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.seed();
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    // users

    pub fn insert_user(
        &self,
        name: &str,
        username: &str,
        role: &str,
        phone: Option<&str>,
    ) -> User {
        self.write().users.insert_with(|id| User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            phone: phone.map(str::to_string),
        })
    }

    pub fn get_user(&self, id: i64) -> Option<User> {
        self.read().users.get(id)
    }

    pub fn list_users(&self) -> Vec<User> {
        self.read().users.list()
    }

    // customers

    pub fn create_customer(&self, new: NewCustomer) -> Customer {
        self.write().customers.insert_with(|id| Customer {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            state: new.state,
            zip: new.zip,
            created_at: Utc::now(),
        })
    }

    pub fn get_customer(&self, id: i64) -> Option<Customer> {
        self.read().customers.get(id)
    }

    pub fn list_customers(&self) -> Vec<Customer> {
        self.read().customers.list()
    }

    // jobs

    pub fn create_job(&self, new: NewJob) -> Job {
        self.write().jobs.insert_with(|id| Job {
            id,
            work_order_number: new.work_order_number,
            customer_id: new.customer_id,
            technician_id: new.technician_id,
            status: new.status,
            description: new.description,
            created_at: Utc::now(),
            scheduled_for: new.scheduled_for,
            time_zone: new.time_zone,
        })
    }

    pub fn get_job(&self, id: i64) -> Option<Job> {
        self.read().jobs.get(id)
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.read().jobs.list()
    }

    pub fn set_job_status(&self, id: i64, status: JobStatus) -> Option<Job> {
        self.write().jobs.update(id, |job| job.status = status)
    }

    // photos

    pub fn create_photo(&self, new: NewPhoto) -> Photo {
        self.write().photos.insert_with(|id| Photo {
            id,
            job_id: new.job_id,
            caption: new.caption,
            data_url: new.data_url,
            taken_at: Utc::now(),
            ai_analysis: None,
            before_photo: new.before_photo,
        })
    }

    pub fn get_photo(&self, id: i64) -> Option<Photo> {
        self.read().photos.get(id)
    }

    pub fn list_photos(&self) -> Vec<Photo> {
        self.read().photos.list()
    }

    pub fn photos_for_job(&self, job_id: i64) -> Vec<Photo> {
        self.read().photos.filter(|photo| photo.job_id == job_id)
    }

    pub fn latest_photo_for_job(&self, job_id: i64) -> Option<Photo> {
        self.read()
            .photos
            .rows
            .values()
            .filter(|photo| photo.job_id == job_id)
            .last()
            .cloned()
    }

    // notes

    pub fn create_note(&self, new: NewNote) -> Note {
        self.write().notes.insert_with(|id| Note {
            id,
            job_id: new.job_id,
            technician_id: new.technician_id,
            content: new.content,
            created_at: Utc::now(),
            enhanced_content: None,
        })
    }

    pub fn get_note(&self, id: i64) -> Option<Note> {
        self.read().notes.get(id)
    }

    pub fn list_notes(&self) -> Vec<Note> {
        self.read().notes.list()
    }

    pub fn notes_for_job(&self, job_id: i64) -> Vec<Note> {
        self.read().notes.filter(|note| note.job_id == job_id)
    }

    /// Overwrites any previous enhancement; the latest call wins.
    pub fn set_note_enhancement(&self, id: i64, text: String) -> Option<Note> {
        self.write()
            .notes
            .update(id, |note| note.enhanced_content = Some(text))
    }

    // materials

    pub fn insert_material(
        &self,
        name: &str,
        description: &str,
        category: &str,
        default_price: i64,
        unit: &str,
    ) -> Material {
        self.write().materials.insert_with(|id| Material {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            default_price,
            unit: unit.to_string(),
        })
    }

    pub fn get_material(&self, id: i64) -> Option<Material> {
        self.read().materials.get(id)
    }

    pub fn list_materials(&self) -> Vec<Material> {
        self.read().materials.list()
    }

    // estimate items

    pub fn create_estimate_item(&self, new: NewEstimateItem) -> EstimateItem {
        self.write().estimate_items.insert_with(|id| EstimateItem {
            id,
            job_id: new.job_id,
            kind: new.kind,
            description: new.description,
            quantity: new.quantity,
            unit_price: new.unit_price,
            store_source: new.store_source,
            material_id: new.material_id,
        })
    }

    pub fn get_estimate_item(&self, id: i64) -> Option<EstimateItem> {
        self.read().estimate_items.get(id)
    }

    pub fn list_estimate_items(&self) -> Vec<EstimateItem> {
        self.read().estimate_items.list()
    }

    pub fn items_for_job(&self, job_id: i64) -> Vec<EstimateItem> {
        self.read().items_for_job(job_id)
    }

    pub fn update_estimate_item(&self, id: i64, patch: EstimateItemPatch) -> Option<EstimateItem> {
        self.write().estimate_items.update(id, |item| {
            if let Some(description) = patch.description {
                item.description = description;
            }
            if let Some(quantity) = patch.quantity {
                item.quantity = quantity;
            }
            if let Some(unit_price) = patch.unit_price {
                item.unit_price = unit_price;
            }
            if let Some(store_source) = patch.store_source {
                item.store_source = store_source;
            }
        })
    }

    pub fn delete_estimate_item(&self, id: i64) -> Option<EstimateItem> {
        self.write().estimate_items.remove(id)
    }

    // estimates

    pub fn get_estimate(&self, id: i64) -> Option<Estimate> {
        self.read().estimates.get(id)
    }

    pub fn estimate_for_job(&self, job_id: i64) -> Option<Estimate> {
        self.read().estimate_for_job(job_id)
    }

    /// Raw status mutator. Does not touch the total; transitions are not
    /// restricted beyond the status enum itself.
    pub fn set_estimate_status(&self, id: i64, status: EstimateStatus) -> Option<Estimate> {
        self.write()
            .estimates
            .update(id, |estimate| estimate.status = status)
    }

    /// Creates the job's estimate if none exists, snapshotting the current
    /// item subtotal as the total. On resubmission the total is recomputed
    /// from the current items unless the amount is locked — locking keeps
    /// the previously quoted price. One estimate per job is enforced here:
    /// this is the only insert path for estimates.
    pub fn submit_estimate(
        &self,
        job_id: i64,
        status: EstimateStatus,
        notes: Option<String>,
        lock_amount: Option<bool>,
    ) -> StoreResult<Estimate> {
        let mut tables = self.write();
        if tables.jobs.get(job_id).is_none() {
            return Err(StoreError::NotFound("job"));
        }
        let subtotal = estimates::subtotal(&tables.items_for_job(job_id));

        if let Some(existing) = tables.estimate_for_job(job_id) {
            let updated = tables.estimates.update(existing.id, |estimate| {
                estimate.status = status;
                if let Some(notes) = notes {
                    estimate.notes = Some(notes);
                }
                if let Some(lock) = lock_amount {
                    estimate.locked_amount = lock;
                }
                if !estimate.locked_amount {
                    estimate.total_amount = subtotal;
                }
            });
            return updated.ok_or(StoreError::NotFound("estimate"));
        }

        Ok(tables.estimates.insert_with(|id| Estimate {
            id,
            job_id,
            status,
            total_amount: subtotal,
            locked_amount: lock_amount.unwrap_or(false),
            created_at: Utc::now(),
            notes,
        }))
    }

    /// Persists an analysis onto a photo and materializes its side effects
    /// in the same lock scope: the job gets a draft estimate if it has
    /// none, and the first identified part becomes a zero-priced material
    /// item awaiting store selection. All writes land together or, when the
    /// photo is missing, not at all.
    pub fn apply_photo_analysis(
        &self,
        photo_id: i64,
        analysis: PhotoAnalysis,
    ) -> StoreResult<AnalysisOutcome> {
        let mut tables = self.write();
        let first_part = analysis.parts.first().cloned();
        let photo = tables
            .photos
            .update(photo_id, |photo| photo.ai_analysis = Some(analysis))
            .ok_or(StoreError::NotFound("photo"))?;
        let job_id = photo.job_id;

        let created_item = first_part.map(|part| {
            tables.estimate_items.insert_with(|id| EstimateItem {
                id,
                job_id,
                kind: ItemKind::Material,
                description: part,
                quantity: 1,
                unit_price: 0,
                store_source: Some(PENDING_STORE_SELECTION.to_string()),
                material_id: None,
            })
        });

        let estimate = match tables.estimate_for_job(job_id) {
            Some(existing) => existing,
            None => {
                let subtotal = estimates::subtotal(&tables.items_for_job(job_id));
                tables.estimates.insert_with(|id| Estimate {
                    id,
                    job_id,
                    status: EstimateStatus::Draft,
                    total_amount: subtotal,
                    locked_amount: false,
                    created_at: Utc::now(),
                    notes: None,
                })
            }
        };

        Ok(AnalysisOutcome {
            photo,
            estimate,
            created_item,
        })
    }

    fn seed(&self) {
        let tech = self.insert_user("Marcus Reed", "mreed", "technician", Some("555-0114"));
        let _tech2 = self.insert_user("Priya Shah", "pshah", "technician", Some("555-0137"));
        self.insert_user("Dana Whitfield", "dwhitfield", "admin", None);

        let harbor = self.create_customer(NewCustomer {
            name: "Harbor Point Apartments".to_string(),
            email: Some("maintenance@harborpoint.example".to_string()),
            phone: Some("555-0199".to_string()),
            address: Some("410 Harbor Point Dr".to_string()),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip: Some("78701".to_string()),
        });
        let lakeside = self.create_customer(NewCustomer {
            name: "Lakeside Dental".to_string(),
            email: Some("office@lakesidedental.example".to_string()),
            phone: Some("555-0142".to_string()),
            address: Some("88 Lakeside Ave".to_string()),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip: Some("78703".to_string()),
        });

        self.create_job(NewJob {
            work_order_number: "WO-1001".to_string(),
            customer_id: harbor.id,
            technician_id: tech.id,
            status: JobStatus::Scheduled,
            description: "Unit 204: toilet runs constantly, suspect fill valve".to_string(),
            scheduled_for: Some(Utc::now() + Duration::days(1)),
            time_zone: Some("America/Chicago".to_string()),
        });
        self.create_job(NewJob {
            work_order_number: "WO-1002".to_string(),
            customer_id: lakeside.id,
            technician_id: tech.id,
            status: JobStatus::InProgress,
            description: "Rooftop condenser not starting, breaker trips on call for cooling"
                .to_string(),
            scheduled_for: None,
            time_zone: Some("America/Chicago".to_string()),
        });

        for (name, description, category, price, unit) in [
            (
                "Copper pipe 1/2 in.",
                "Type L copper supply pipe, 10 ft length",
                "Plumbing",
                1_899,
                "length",
            ),
            (
                "Wax ring kit",
                "Toilet wax ring with brass closet bolts",
                "Plumbing",
                649,
                "each",
            ),
            (
                "Fill valve",
                "Universal toilet fill valve, adjustable height",
                "Plumbing",
                1_299,
                "each",
            ),
            (
                "P-trap assembly",
                "1-1/2 in. PVC P-trap with slip joints",
                "Plumbing",
                879,
                "each",
            ),
            (
                "Run capacitor 45/5",
                "45/5 MFD 440V dual run capacitor",
                "HVAC",
                2_499,
                "each",
            ),
            (
                "Contactor 2-pole",
                "30A condenser contactor, 24V coil",
                "HVAC",
                2_199,
                "each",
            ),
            (
                "Hot surface igniter",
                "Furnace hot surface igniter, silicon nitride",
                "HVAC",
                3_499,
                "each",
            ),
            (
                "Air filter 16x25x1",
                "MERV 8 pleated air filter",
                "HVAC",
                1_099,
                "each",
            ),
            (
                "Breaker 15A",
                "15A single-pole circuit breaker",
                "Electrical",
                1_249,
                "each",
            ),
            (
                "GFCI outlet",
                "20A tamper-resistant GFCI receptacle",
                "Electrical",
                2_299,
                "each",
            ),
        ] {
            self.insert_material(name, description, category, price, unit);
        }
    }
}
