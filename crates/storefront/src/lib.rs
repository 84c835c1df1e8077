//! Tamarind Storefront - client-side storefront state core.
//!
//! This crate is the stateful heart of the Tamarind storefront UI: the
//! shopping cart, the checkout flow, favorites, and the local order list.
//! It owns no rendering and no routing; a UI host drives it through plain
//! method calls and reads state back out.
//!
//! # Architecture
//!
//! - [`cart`] - In-memory cart aggregate with merge-by-id line items
//! - [`checkout`] - Validation-gated order submission state machine
//! - [`favorites`] - Durable set of favorited products
//! - [`orders`] - Durable local order list with per-order status watches
//! - [`gateway`] - Key/value persistence boundary (origin-scoped storage)
//! - [`backend`] - External document-store boundary (orders, products)
//! - [`session`] - Composition root tying the stores together
//!
//! All persistence, querying, and order fulfillment live behind the
//! [`gateway::PersistenceGateway`] and [`backend::Backend`] seams; the
//! stores themselves are synchronous single-threaded state. The only
//! suspension points are backend calls.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod favorites;
pub mod gateway;
pub mod notice;
pub mod orders;
pub mod session;
