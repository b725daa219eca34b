//! `tk-roles` — the `Role` tagged union and trip-chain dispatcher.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-------------------------------------------------------------------|
//! | [`intent`]     | `Intent` enum (`TravelTo`, `WakeAt`, `SendMessage`)             |
//! | [`context`]    | `SimContext<'a>` — read-only tick snapshot shared by all agents |
//! | [`role`]       | `Role`, `TravelState`, `WaitBusState`, `ActivityState`          |
//! | [`factory`]    | `RoleFactory` — builds a `Role` for a trip-chain item           |
//! | [`dispatcher`] | `Dispatcher`, `AgentRoleState` — trip-chain progression          |
//! | [`error`]      | `RoleError`, `RoleResult<T>`                                    |
//!
//! # Design notes
//!
//! `Role` is a flat tagged union, not a trait hierarchy (spec.md §9): every
//! agent holds exactly one `Role`, and `Dispatcher::advance` swaps it for the
//! next trip-chain item's role once the current one reports
//! [`Role::is_done`]. tk-sim calls `perceive`/`decide`/`move_` on the live
//! role during the per-tick update phase, then calls `Dispatcher::advance`
//! once the role's intents have been applied.

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod intent;
pub mod role;

pub use context::SimContext;
pub use dispatcher::{AgentRoleState, Dispatcher};
pub use error::{RoleError, RoleResult};
pub use factory::RoleFactory;
pub use intent::Intent;
pub use role::{ActivityState, Role, TravelState, WaitBusState};
