//! Streaming reader for the `md:FullModel` header of a CGMES file.

use std::io::{BufReader, Read};

use cgmes_core::metadata::parse_datetime;
use cgmes_core::{names, CgmesMetadataModel, CgmesResult, CgmesSubset};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::format_error;

const FULL_MODEL: &[u8] = names::FULL_MODEL.as_bytes();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Child {
    ScenarioTime,
    Created,
    Description,
    Version,
    Profile,
    DependentOn,
    Supersedes,
    ModelingAuthoritySet,
}

impl Child {
    fn from_local_name(name: &[u8]) -> Option<Child> {
        match name {
            b"Model.scenarioTime" => Some(Child::ScenarioTime),
            b"Model.created" => Some(Child::Created),
            b"Model.description" => Some(Child::Description),
            b"Model.version" => Some(Child::Version),
            b"Model.profile" => Some(Child::Profile),
            b"Model.DependentOn" => Some(Child::DependentOn),
            b"Model.Supersedes" => Some(Child::Supersedes),
            b"Model.modelingAuthoritySet" => Some(Child::ModelingAuthoritySet),
            _ => None,
        }
    }
}

fn attribute(element: &BytesStart, local: &[u8]) -> CgmesResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(format_error)?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value().map_err(format_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn apply(model: CgmesMetadataModel, child: Child, value: &str) -> CgmesMetadataModel {
    let value = value.trim();
    if value.is_empty() {
        return model;
    }
    match child {
        Child::ScenarioTime => match parse_datetime(value) {
            Some(t) => model.with_scenario_time(t),
            None => {
                debug!(value, "unparseable scenario time");
                model
            }
        },
        Child::Created => match parse_datetime(value) {
            Some(t) => model.with_created(t),
            None => {
                debug!(value, "unparseable creation time");
                model
            }
        },
        Child::Description => model.with_description(value),
        Child::Version => match value.parse::<i32>() {
            Ok(v) => model.with_version(v),
            Err(_) => {
                debug!(value, "non-integer model version");
                model
            }
        },
        Child::Profile => {
            let mut model = model;
            model.add_profile(value);
            model
        }
        Child::DependentOn => {
            let mut model = model;
            model.add_depends_on(value);
            model
        }
        Child::Supersedes => {
            let mut model = model;
            model.add_supersedes(value);
            model
        }
        Child::ModelingAuthoritySet => model.with_modeling_authority_set(value),
    }
}

fn header_start(element: &BytesStart, subset: CgmesSubset) -> CgmesResult<CgmesMetadataModel> {
    let id = match attribute(element, b"about")? {
        Some(about) => Some(about),
        None => attribute(element, b"ID")?,
    };
    let header = CgmesMetadataModel::empty(subset);
    Ok(match id {
        Some(id) => header.with_id(id),
        None => header,
    })
}

/// Reads the header of a CGMES document.
///
/// Returns `None` when the document has no `FullModel` header before its first
/// data element (CIM14 files carry none). Unknown header children are
/// skipped. A header lacking one of the mandatory fields fails with
/// [`MissingMandatoryField`](cgmes_core::CgmesError::MissingMandatoryField).
pub fn read_metadata<R: Read>(
    input: R,
    subset: CgmesSubset,
) -> CgmesResult<Option<CgmesMetadataModel>> {
    let mut reader = Reader::from_reader(BufReader::new(input));
    reader.trim_text(true);
    let mut buf = Vec::new();
    // Root element at depth 1, header at 2, header children at 3
    let mut depth = 0usize;
    let mut model: Option<CgmesMetadataModel> = None;
    let mut child: Option<Child> = None;
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(format_error)? {
            Event::Start(ref e) => {
                depth += 1;
                let is_header = e.local_name().as_ref() == FULL_MODEL;
                match (model.is_some(), depth) {
                    (false, 2) if is_header => model = Some(header_start(e, subset)?),
                    (false, 2) => return Ok(None),
                    (true, 3) => {
                        child = Child::from_local_name(e.local_name().as_ref());
                        text.clear();
                        if let (Some(c), Some(resource)) = (child, attribute(e, b"resource")?) {
                            model = model.map(|m| apply(m, c, &resource));
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let is_header = e.local_name().as_ref() == FULL_MODEL;
                match (model.is_some(), depth + 1) {
                    (false, 2) if is_header => {
                        model = Some(header_start(e, subset)?);
                        break;
                    }
                    (false, 2) => return Ok(None),
                    (true, 3) => {
                        if let Some(c) = Child::from_local_name(e.local_name().as_ref()) {
                            if let Some(resource) = attribute(e, b"resource")? {
                                model = model.map(|m| apply(m, c, &resource));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref t) => {
                if child.is_some() {
                    text.push_str(&t.unescape().map_err(format_error)?);
                }
            }
            Event::CData(ref t) => {
                if child.is_some() {
                    text.push_str(&String::from_utf8_lossy(t));
                }
            }
            Event::End(ref e) => {
                if model.is_some() {
                    if depth == 3 {
                        if let Some(c) = child.take() {
                            model = model.map(|m| apply(m, c, &text));
                        }
                    } else if depth == 2 && e.local_name().as_ref() == FULL_MODEL {
                        break;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    match model {
        Some(header) => {
            header.validate()?;
            debug!(id = header.id(), subset = %header.subset(), "metadata header read");
            Ok(Some(header))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmes_core::CgmesError;

    fn document(children: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
         xmlns:cim="http://iec.ch/TC57/2013/CIM-schema-cim16#">
  <md:FullModel rdf:about="urn:uuid:77b55f87-fc1e-4046-9599-6c6b4f991a86">
{children}
  </md:FullModel>
  <cim:Terminal rdf:ID="_T1"/>
</rdf:RDF>"#
        )
    }

    const COMPLETE: &str = r#"
    <md:Model.scenarioTime>2030-01-02T09:00:00</md:Model.scenarioTime>
    <md:Model.created>2030-01-01T12:00:00Z</md:Model.created>
    <md:Model.description>CGMES Conformity Assessment &amp; test</md:Model.description>
    <md:Model.version>4</md:Model.version>
    <md:Model.profile>http://entsoe.eu/CIM/Topology/4/1</md:Model.profile>
    <md:Model.profile>http://entsoe.eu/CIM/EquipmentCore/3/1</md:Model.profile>
    <md:Model.DependentOn rdf:resource="urn:uuid:eq-model"/>
    <md:Model.Supersedes rdf:resource="urn:uuid:old-model"/>
    <md:Model.futureExtension>ignored</md:Model.futureExtension>
    <md:Model.modelingAuthoritySet>http://elia.be/CGMES/2.4.15</md:Model.modelingAuthoritySet>"#;

    #[test]
    fn complete_header() {
        let model = read_metadata(document(COMPLETE).as_bytes(), CgmesSubset::Unknown)
            .unwrap()
            .unwrap();
        assert_eq!(model.id(), Some("urn:uuid:77b55f87-fc1e-4046-9599-6c6b4f991a86"));
        assert_eq!(model.version(), Some(4));
        assert_eq!(model.description(), Some("CGMES Conformity Assessment & test"));
        assert_eq!(model.profiles().len(), 2);
        assert!(model.depends_on().contains("urn:uuid:eq-model"));
        assert!(model.supersedes().contains("urn:uuid:old-model"));
        assert_eq!(
            model.modeling_authority_set(),
            Some("http://elia.be/CGMES/2.4.15")
        );
        assert_eq!(
            model.scenario_time().map(|t| t.to_rfc3339()),
            Some("2030-01-02T09:00:00+00:00".to_string())
        );
    }

    #[test]
    fn profile_order_does_not_matter() {
        let swapped = COMPLETE.replace(
            "<md:Model.profile>http://entsoe.eu/CIM/Topology/4/1</md:Model.profile>",
            "",
        ) + "\n    <md:Model.profile>http://entsoe.eu/CIM/Topology/4/1</md:Model.profile>";
        let a = read_metadata(document(COMPLETE).as_bytes(), CgmesSubset::Topology)
            .unwrap()
            .unwrap();
        let b = read_metadata(document(&swapped).as_bytes(), CgmesSubset::Topology)
            .unwrap()
            .unwrap();
        assert_eq!(a.profiles(), b.profiles());
    }

    #[test]
    fn missing_version_is_named() {
        let children = COMPLETE.replace("<md:Model.version>4</md:Model.version>", "");
        let err = read_metadata(document(&children).as_bytes(), CgmesSubset::Unknown).unwrap_err();
        assert!(matches!(
            err,
            CgmesError::MissingMandatoryField { field: "version" }
        ));
    }

    #[test]
    fn file_without_header() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <cim:Terminal rdf:ID="_T1"><cim:IdentifiedObject.name>T1</cim:IdentifiedObject.name></cim:Terminal>
  <md:FullModel rdf:about="urn:uuid:late"/>
</rdf:RDF>"#;
        assert_eq!(read_metadata(doc.as_bytes(), CgmesSubset::Unknown).unwrap(), None);
        assert_eq!(read_metadata("".as_bytes(), CgmesSubset::Unknown).unwrap(), None);
    }

    #[test]
    fn empty_header_element_fails_validation() {
        let doc = r#"<rdf:RDF><md:FullModel rdf:about="urn:uuid:x"/></rdf:RDF>"#;
        assert!(matches!(
            read_metadata(doc.as_bytes(), CgmesSubset::Unknown),
            Err(CgmesError::MissingMandatoryField { field: "scenarioTime" })
        ));
    }
}
