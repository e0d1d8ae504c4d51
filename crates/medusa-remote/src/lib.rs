//! Terminal remote control for a Medusa head.
//!
//! The playing view is kept in step with the head by a polling
//! [`reconcile::Reconciler`]; user input becomes snake commands through the
//! [`dispatch`] module.

pub mod action;
pub mod app;
pub mod app_state;
pub mod component;
pub mod components;
pub mod dispatch;
pub mod keymap;
pub mod poller;
pub mod reconcile;
pub mod session;
pub mod theme;
pub mod transport;
pub mod view;
pub mod widgets;
