//! Synthetic customer documents.
//!
//! Generation is a pure function of the index, so every run inserts the
//! same data and results stay comparable across runs. `_id`s are assigned
//! separately, right before a trial's insert.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use crate::error::Result;

/// Build the customer document for index `i`.
pub fn customer(i: usize) -> Document {
    let n = i as i64;
    doc! {
        "Name": format!("Customer {}", i),
        "Address": {
            "Street": format!("Street {}", i),
            "City": format!("City {}", i),
            "Country": format!("Country {}", i),
        },
        "OrderCount": n,
        "TotalSpent": n * 100,
    }
}

/// Generate `count` customer documents, indexes `0..count`.
pub fn generate_documents(count: usize) -> Vec<Document> {
    (0..count).map(customer).collect()
}

/// Prepend a fresh `ObjectId` `_id`, as the server does for documents
/// inserted without one. Documents that already carry an `_id` are returned
/// unchanged.
pub fn with_object_id(doc: Document) -> Document {
    if doc.contains_key("_id") {
        return doc;
    }
    let mut out = doc! { "_id": ObjectId::new() };
    for (key, value) in doc {
        out.insert(key, value);
    }
    out
}

/// Size in bytes of the JSON encoding of a document list.
pub fn payload_size(docs: &[Document]) -> Result<u64> {
    let encoded = serde_json::to_vec(docs)?;
    Ok(encoded.len() as u64)
}
