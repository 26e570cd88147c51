//! Aurelle Core - Shared domain types and storefront logic.
//!
//! This crate provides the types used across all Aurelle components:
//! - `storefront` - Public-facing perfume shop
//! - `admin` - Internal dashboard for products, orders and customers
//! - `cli` - Command-line tools for session-store migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. The REST backend is the source of truth
//! for every entity; the logic here is what the web tier does with the data
//! it mirrors (cart arithmetic, merge-on-login, filtering, validation).
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, passwords and statuses
//! - [`catalog`] - Products, filtering, sorting and pagination
//! - [`cart`] - Cart lines, totals and guest/server reconciliation
//! - [`customer`] - Customer accounts
//! - [`favorites`] - Favorite product sets
//! - [`address`] - Philippine addresses and the cascading location picker
//! - [`payment`] - Payment methods and card/e-wallet validation
//! - [`order`] - Orders, shipping policy and checkout validation
//! - [`notification`] - Customer notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod favorites;
pub mod notification;
pub mod order;
pub mod payment;
pub mod types;

pub use types::*;
