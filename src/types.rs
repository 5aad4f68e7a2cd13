/// Five-digit ZIP code (ZCTA) kept as text to preserve leading zeros.
/// Examples: `12180`, `02139`
pub type ZipCode = String;
/// Name of a static data asset resolved by a transport.
/// Examples: `merged_enrollment_demographics.csv`, `zip_code_similarities.json`
pub type AssetName = String;
/// Raw cell value read from a delimited-text source.
/// Examples: `Troy`, `NY`, `50000`, `Fall 2021`
pub type CellValue = String;
/// Free-text user annotation attached to a row.
/// Example: `follow up with admissions`
pub type AnnotationText = String;
/// Category label used in distribution summaries.
/// Examples: `Albany`, `Other`
pub type CategoryLabel = String;
/// Basemap identifier published on the basemap bus.
/// Examples: `streets-vector`, `dark-gray-vector`
pub type BasemapId = String;
/// Email address identifying a signed-in user.
/// Example: `analyst@example.edu`
pub type Email = String;
/// Collection name inside a document store.
/// Example: `annotations`
pub type CollectionName = String;
/// Document identifier inside a collection.
/// Example: `analyst@example.edu`
pub type DocumentId = String;
/// User-visible notice text.
/// Examples: `No similar zip codes found for 99999`, `asset 'rows.csv' could not be fetched: ...`
pub type NoticeMessage = String;
