// unpoller-api: Async client for the UniFi Network controller's stat API
//
// Cookie or API-key authenticated access to sites, clients, devices,
// DPI tables, events, IDS, alarms, and anomalies. Every record is stamped
// with the site and controller it came from.

pub mod auth;
pub mod client;
pub mod clients;
pub mod devices;
pub mod dpi;
pub mod error;
pub mod events;
pub mod flex;
pub mod login;
pub mod models;
pub mod sites;
pub mod system;
pub mod transport;

pub use auth::ControllerPlatform;
pub use client::ControllerClient;
pub use error::Error;
pub use flex::{FlexBool, FlexInt};
pub use models::{
    Alarm, Anomaly, Client, DeviceCommon, DeviceStat, Devices, DpiApp, DpiTable, Event, Health,
    Ids, IpGeo, Site, Uap, Udm, Usg, Usw,
};
pub use transport::{TlsMode, TransportConfig};
