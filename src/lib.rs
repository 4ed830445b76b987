//! # Agro Store Core
//!
//! Local record store for a farm management mobile app. Keeps the app's four
//! collections (users, animals, health records, production records) in
//! memory, persists each one to an LMDB environment on the device, and
//! provides the validation, search and report logic the screens share.
//!
//! ## Features
//!
//! - **LMDB-backed persistence**: one JSON blob per collection, rewritten on every append
//! - **Field validation**: every violation of a record reported at once
//! - **Case-insensitive search**: substring filtering with a per-screen empty-term policy
//! - **Reports**: totals and chart-ready series
//! - **FFI-first**: C-compatible functions returning JSON envelopes
//!
//! ## Quick Start
//!
//! ```no_run
//! use agro_store_core::{create_store, append_record, summarize_records};
//! use std::ffi::CString;
//!
//! let name = CString::new("farm").unwrap();
//! let store = create_store(name.as_ptr());
//!
//! let kind = CString::new("animals").unwrap();
//! let json = CString::new(r#"{"codigoBrinco":"BR-001","raca":"Nelore","sexo":"Macho"}"#).unwrap();
//! let result = append_record(store, kind.as_ptr(), json.as_ptr());
//!
//! let report = summarize_records(store);
//! ```
//!
//! ## FFI Functions
//!
//! - [`create_store`] - Open the store and load every collection
//! - [`append_record`] - Validate and append a record
//! - [`validate_record`] - Validate without storing
//! - [`get_snapshot`] - Current contents of all collections
//! - [`filter_records`] - Case-insensitive substring search
//! - [`summarize_records`] - Counts and chart series
//! - [`authenticate_user`] - Login lookup
//! - [`clear_all_records`] - Empty every collection
//! - [`close_store`] - Flush and release the handle
//! - [`free_response`] - Release a string returned by any function above

pub mod app_response;
pub mod farm_model;
pub mod kv_store;
pub mod lmdb_store;
pub mod query;
pub mod record_store;
pub mod report;
pub mod store_config;
pub mod validation;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::farm_model::{Collection, FarmRecord};
use crate::lmdb_store::LmdbStore;
use crate::query::{EmptyTerm, Searchable};
use crate::record_store::RecordStore;
use crate::store_config::StoreConfig;

/// Store handle handed across the FFI boundary.
pub type AppStoreState = RecordStore<LmdbStore>;

/// Opens the store named `name` and loads its collections.
///
/// The LMDB environment lives in the directory `"{name}.lmdb"`, created if
/// missing. Stored collections that cannot be read start out empty.
///
/// # Returns
///
/// A pointer to the ready [`AppStoreState`], or null if `name` is null, not
/// UTF-8, or the environment cannot be opened. Release it with [`close_store`].
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call. The returned pointer is owned by the caller
/// and must be released exactly once with [`close_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut AppStoreState {
    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    let config = StoreConfig::new(name_str);
    info!("Opening record store at: {}", config.db_path().display());

    match LmdbStore::init(&config) {
        Ok(adapter) => Box::into_raw(Box::new(RecordStore::open(adapter))),
        Err(e) => {
            warn!("Failed to open record store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Validates and appends a record to `collection`.
///
/// `collection` is one of `users`, `animals`, `healthRecords`,
/// `productionRecords`; `json_ptr` holds a single record object.
///
/// # Returns
///
/// - `Ok` with the stored record as JSON
/// - `ValidationError` with every offending field, nothing stored
/// - `DatabaseError` if the write failed; the record is not kept, retrying is safe
/// - `SerializationError` / `BadRequest` for malformed input
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`], not
/// used concurrently from another thread. `collection` and `json_ptr` must be
/// null or valid NUL-terminated strings. The returned string must be released
/// with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn append_record(
    state: *mut AppStoreState,
    collection: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("append_record")),
    };

    let record = match parse_record(collection, json_ptr) {
        Ok(record) => record,
        Err(error) => return response_to_c_string(&error),
    };

    let stored = match record.to_json() {
        Ok(json) => json,
        Err(error) => return response_to_c_string(&error),
    };

    match state.submit(record) {
        Ok(()) => response_to_c_string(&AppResponse::Ok(stored)),
        Err(error) => response_to_c_string(&error),
    }
}

/// Runs the validation rules of `collection` against a record without storing it.
///
/// Returns `Ok` if the record would be accepted, otherwise a
/// `ValidationError` mapping each offending field to its message.
///
/// # Safety
///
/// Both parameters must be null or valid NUL-terminated strings. The returned
/// string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn validate_record(
    collection: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let record = match parse_record(collection, json_ptr) {
        Ok(record) => record,
        Err(error) => return response_to_c_string(&error),
    };

    match validation::validate(&record) {
        Ok(()) => response_to_c_string(&AppResponse::success("Record accepted")),
        Err(violations) => response_to_c_string(&AppResponse::ValidationError(violations)),
    }
}

/// Returns the four collections as a JSON object
/// (`users`, `animals`, `healthRecords`, `productionRecords`).
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`]. The
/// returned string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_snapshot(state: *mut AppStoreState) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("get_snapshot")),
    };

    json_response(&state.snapshot())
}

/// Filters `collection` by a case-insensitive substring match on `field`.
///
/// When `term` is empty the result is the whole collection if
/// `show_all_on_empty` is true, and an empty list otherwise. Records without
/// `field` never match.
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`].
/// `collection`, `field` and `term` must be null or valid NUL-terminated
/// strings. The returned string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn filter_records(
    state: *mut AppStoreState,
    collection: *const c_char,
    field: *const c_char,
    term: *const c_char,
    show_all_on_empty: bool,
) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("filter_records")),
    };

    let collection = match c_ptr_to_string(collection, "collection") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };
    let field = match c_ptr_to_string(field, "field") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };
    let term = match c_ptr_to_string(term, "term") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    let collection: Collection = match collection.parse() {
        Ok(c) => c,
        Err(error) => return response_to_c_string(&error),
    };

    let empty = if show_all_on_empty { EmptyTerm::ShowAll } else { EmptyTerm::HideAll };
    let snapshot = state.snapshot();

    match collection {
        Collection::Users => filtered_response(snapshot.users, &field, &term, empty),
        Collection::Animals => filtered_response(snapshot.animals, &field, &term, empty),
        Collection::HealthRecords => {
            filtered_response(snapshot.health_records, &field, &term, empty)
        }
        Collection::ProductionRecords => {
            filtered_response(snapshot.production_records, &field, &term, empty)
        }
    }
}

/// Returns record counts, the `[Animals, Health, Production]` chart series and report cards.
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`]. The
/// returned string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn summarize_records(state: *mut AppStoreState) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("summarize_records")),
    };

    json_response(&state.summary())
}

/// Looks up the first user registered with exactly this e-mail and password.
///
/// Returns `Ok` with the user as JSON, or `NotFound` if no user matches.
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`].
/// `email` and `senha` must be null or valid NUL-terminated strings. The
/// returned string must be released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn authenticate_user(
    state: *mut AppStoreState,
    email: *const c_char,
    senha: *const c_char,
) -> *const c_char {
    let state = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("authenticate_user")),
    };

    let email = match c_ptr_to_string(email, "email") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };
    let senha = match c_ptr_to_string(senha, "senha") {
        Ok(s) => s,
        Err(error_ptr) => return error_ptr,
    };

    match state.find_user(&email, &senha) {
        Some(user) => json_response(user),
        None => {
            let error = AppResponse::NotFound("Incorrect e-mail or password".to_string());
            response_to_c_string(&error)
        }
    }
}

/// Empties all four collections, in memory and on disk.
///
/// # Safety
///
/// `state` must be null or a live pointer returned by [`create_store`], not
/// used concurrently from another thread. The returned string must be
/// released with [`free_response`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_records(state: *mut AppStoreState) -> *const c_char {
    let state = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => return response_to_c_string(&null_state("clear_all_records")),
    };

    match state.clear_all() {
        Ok(()) => response_to_c_string(&AppResponse::success("All records cleared successfully")),
        Err(error) => response_to_c_string(&error),
    }
}

/// Flushes the environment to disk and releases the handle.
///
/// `state` must not be used after this call, whatever the result.
///
/// # Safety
///
/// `state` must be null or a pointer returned by [`create_store`] that has not
/// been closed yet. Closing the same pointer twice is undefined behavior.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(state: *mut AppStoreState) -> *const c_char {
    if state.is_null() {
        return response_to_c_string(&null_state("close_store"));
    }

    let store = unsafe { Box::from_raw(state) };
    let result = store.adapter().close();
    drop(store);

    match result {
        Ok(()) => response_to_c_string(&AppResponse::success("Store closed successfully")),
        Err(error) => response_to_c_string(&error),
    }
}

/// Releases a string returned by any function of this library.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that has not been
/// freed yet. Strings from any other allocator must not be passed here.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn null_state(function: &str) -> AppResponse {
    AppResponse::BadRequest(format!("Null state pointer passed to {function}"))
}

/// Reads the collection name and record JSON of an incoming record.
fn parse_record(
    collection: *const c_char,
    json_ptr: *const c_char,
) -> Result<FarmRecord, AppResponse> {
    let collection = c_ptr_to_str(collection, "collection")?;
    let json = c_ptr_to_str(json_ptr, "JSON")?;

    let collection: Collection = collection.parse()?;
    FarmRecord::from_json(collection, &json).map_err(|e| match e {
        AppResponse::SerializationError(msg) => {
            AppResponse::SerializationError(format!("Invalid JSON: {msg}"))
        }
        other => other,
    })
}

fn filtered_response<T: Searchable + Serialize>(
    items: &[T],
    field: &str,
    term: &str,
    empty: EmptyTerm,
) -> *const c_char {
    json_response(&query::filter(items, field, term, empty))
}

/// Wraps `value` serialized as JSON in an `Ok` envelope.
fn json_response<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Error serializing result: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Converts an [`AppResponse`] to a C string owned by the caller.
///
/// Returns null if the response cannot be serialized or contains a NUL byte.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_str(ptr: *const c_char, field_name: &str) -> Result<String, AppResponse> {
    if ptr.is_null() {
        return Err(AppResponse::BadRequest(format!("Null {field_name} pointer")));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => Err(AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"))),
    }
}

/// Like [`c_ptr_to_str`] but with the error already converted for returning across FFI.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    c_ptr_to_str(ptr, field_name).map_err(|error| response_to_c_string(&error))
}
