//! Parcel trip matching for diaspora travellers.
//!
//! Carriers post the trips they are making with room in their luggage;
//! senders search for a trip that can pick a parcel up near them and drop
//! it off near its recipient.

pub mod analytics;
pub mod backend;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod geo;
pub mod search;
pub mod web;
