pub mod xml_transport;

pub use xml_transport::XmlTransport;
