//! Announcement board for JupyterHub's announcement service.
//!
//! [`client::AnnouncementClient`] talks to the service, [`board::Board`]
//! keeps a polled list plus the viewer's dismissals, and
//! [`config::BoardConfig`] gathers settings from the environment.

pub mod board;
pub mod client;
pub mod config;
