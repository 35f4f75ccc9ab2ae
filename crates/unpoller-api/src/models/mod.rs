// Controller response types
//
// Models for the stat API. Every struct uses `#[serde(default)]` because
// field presence varies across firmware versions, and counters go through
// `FlexInt`/`FlexBool` because their JSON type varies too. Plain fields read
// an explicit `null` as their default through `flex::nullable`. `site_name` and
// `source_name` are never sent by the controller; the fetch layer stamps them.

mod client;
mod device;
mod dpi;
mod event;
mod site;

pub use client::Client;
pub use device::{
    DeviceCommon, DeviceStat, Devices, NetworkEntry, Port, RadioEntry, RadioStats, SpeedtestStatus,
    SysStats, SystemStats, TcpStats, TxLatency, Uap, Udm, Uplink, Usg, Usw, Vap, Wan,
};
pub use dpi::{DpiApp, DpiTable};
pub use event::{Alarm, Anomaly, Event, Ids, IpGeo};
pub use site::{GatewayStats, Health, Site};
