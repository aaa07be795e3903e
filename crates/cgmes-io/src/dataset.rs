//! Provenance of a dataset: the metadata header of every CGMES file.

use cgmes_core::{CgmesMetadataModel, CgmesModel, CgmesResult, CgmesSubset};
use serde::Serialize;
use tracing::info;

use crate::data_source::ReadOnlyDataSource;
use crate::metadata::read_metadata;
use crate::namespace_reader::with_first_zip_entry;
use crate::on_data_source::{is_zip_name, CgmesOnDataSource};

/// Metadata header of one file of a dataset.
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    pub file: String,
    pub metadata: CgmesMetadataModel,
}

/// Headers of every CGMES file in the data source, in listing order.
/// Files without a header (CIM14 data) are left out.
pub fn read_dataset_metadata<D: ReadOnlyDataSource>(
    cgmes: &CgmesOnDataSource<D>,
) -> CgmesResult<Vec<FileMetadata>> {
    let mut headers = Vec::new();
    for file in cgmes.names()? {
        let subset = CgmesSubset::classify(&file);
        let stream = cgmes.data_source().new_input_stream(&file)?;
        let metadata = if is_zip_name(&file) {
            with_first_zip_entry(stream, |entry| read_metadata(entry, subset))?.flatten()
        } else {
            read_metadata(stream, subset)?
        };
        if let Some(metadata) = metadata {
            headers.push(FileMetadata { file, metadata });
        }
    }
    Ok(headers)
}

/// Attach the header of every CGMES file to `model`. Returns how many were attached.
pub fn attach_metadata<D: ReadOnlyDataSource>(
    model: &mut CgmesModel,
    cgmes: &CgmesOnDataSource<D>,
) -> CgmesResult<usize> {
    let headers = read_dataset_metadata(cgmes)?;
    let count = headers.len();
    for header in headers {
        model.add_metadata(header.metadata);
    }
    info!(count, model = model.model_id(), "metadata attached");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::MemDataSource;
    use cgmes_core::{InMemoryRecords, ModelConfig};

    fn file(profile: &str, id: &str) -> String {
        format!(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:md="http://iec.ch/TC57/61970-552/ModelDescription/1#"
         xmlns:cim="http://iec.ch/TC57/2013/CIM-schema-cim16#">
  <md:FullModel rdf:about="{id}">
    <md:Model.scenarioTime>2030-01-02T09:00:00Z</md:Model.scenarioTime>
    <md:Model.created>2030-01-01T12:00:00Z</md:Model.created>
    <md:Model.version>1</md:Model.version>
    <md:Model.profile>{profile}</md:Model.profile>
    <md:Model.modelingAuthoritySet>http://tso.example/</md:Model.modelingAuthoritySet>
  </md:FullModel>
</rdf:RDF>"#
        )
    }

    #[test]
    fn headers_are_attached_to_model() {
        let ds = MemDataSource::new("grid")
            .with_entry(
                "grid_EQ.xml",
                file("http://entsoe.eu/CIM/EquipmentCore/3/1", "urn:uuid:eq"),
            )
            .with_entry(
                "grid_TP.xml",
                file("http://entsoe.eu/CIM/Topology/4/1", "urn:uuid:tp"),
            )
            .with_entry(
                "grid_SSH.xml",
                r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:cim="http://iec.ch/TC57/2013/CIM-schema-cim16#"/>"#,
            );
        let cgmes = CgmesOnDataSource::new(ds);

        let headers = read_dataset_metadata(&cgmes).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].file, "grid_EQ.xml");
        assert_eq!(headers[0].metadata.subset(), CgmesSubset::Equipment);

        let mut model = CgmesModel::new(InMemoryRecords::new(), ModelConfig::default());
        assert_eq!(attach_metadata(&mut model, &cgmes).unwrap(), 2);
        assert_eq!(model.model_id(), "urn:uuid:eq");
        assert_eq!(model.version(), Some(1));
        assert!(model.has_equipment_core());
    }
}
