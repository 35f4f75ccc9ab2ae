// Every descriptor set, registered together for one scrape

use prometheus::{Registry, Result};

use crate::clients::ClientDescs;
use crate::device::DeviceDescs;
use crate::export::Builder;
use crate::site::SiteDescs;
use crate::uap::UapDescs;
use crate::usg::UsgDescs;
use crate::usw::UswDescs;

pub(crate) struct Descs {
    pub(crate) client: ClientDescs,
    pub(crate) site: SiteDescs,
    pub(crate) device: DeviceDescs,
    pub(crate) uap: UapDescs,
    pub(crate) usg: UsgDescs,
    pub(crate) usw: UswDescs,
    count: usize,
}

impl Descs {
    pub(crate) fn new(registry: &Registry, namespace: &str) -> Result<Self> {
        let mut b = Builder::new(registry, namespace);

        let client = ClientDescs::new(&mut b)?;
        let site = SiteDescs::new(&mut b)?;
        let device = DeviceDescs::new(&mut b)?;
        let uap = UapDescs::new(&mut b)?;
        let usg = UsgDescs::new(&mut b)?;
        let usw = UswDescs::new(&mut b)?;

        Ok(Self {
            client,
            site,
            device,
            uap,
            usg,
            usw,
            count: b.count(),
        })
    }

    /// Descriptors registered.
    pub(crate) fn count(&self) -> usize {
        self.count
    }
}
