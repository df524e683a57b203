// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Update notifications for device state.
//!
//! Every merge of a reported document ends with a notification to the
//! device's listeners, whether or not any field changed. Listeners take no
//! arguments; they read what they need from the device afterwards.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Ordered registry that stores and invokes callbacks
//! - [`Subscribable`] - Trait for types that accept update listeners
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! use hatch_restore::subscription::CallbackRegistry;
//!
//! let registry = CallbackRegistry::new();
//! let hits = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&hits);
//!
//! let id = registry.on_update(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! registry.dispatch();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! assert!(registry.unsubscribe(id));
//! registry.dispatch();
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```
//!
//! Callbacks run synchronously on the thread performing the merge and must
//! not block.

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
