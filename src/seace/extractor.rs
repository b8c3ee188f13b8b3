use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::{DriverError, ScraperError};
use crate::traits::{By, Document, ReportSink};
use crate::wait::settle;

use super::types::{ExtractedRecord, Extraction};

/// Reads the fields of the detail view currently on screen.
pub struct FieldExtractor<'a, D> {
    doc: &'a D,
    config: &'a ScraperConfig,
}

impl<'a, D: Document> FieldExtractor<'a, D> {
    pub fn new(doc: &'a D, config: &'a ScraperConfig) -> Self {
        Self { doc, config }
    }

    /// Extracts record `index` and writes it to `sink` when it has a winner.
    ///
    /// Returns whether a line was emitted.
    pub async fn extract_and_report<S>(&self, index: usize, sink: &mut S) -> Result<bool, ScraperError>
    where
        S: ReportSink + ?Sized,
    {
        match self.extract(index).await? {
            Extraction::Winner(record) => {
                info!(
                    "Proceso {} ({}) con ganador: {}",
                    record.sequence_id, record.description, record.winner_name
                );
                sink.emit(&record)?;
                Ok(true)
            }
            Extraction::NoWinner {
                sequence_id,
                description,
            } => {
                info!("Proceso {} ({}) sin ganador", sequence_id, description);
                Ok(false)
            }
        }
    }

    pub async fn extract(&self, index: usize) -> Result<Extraction, ScraperError> {
        let sel = &self.config.selectors;

        let nomenclature = self.read(index, "nomenclature", &sel.nomenclature).await?;
        let entity = self.read(index, "entity", &sel.entity).await?;
        let object_type = self.read(index, "object type", &sel.object_type).await?;
        let value = self.read(index, "value", &sel.value).await?;
        let currency = self.read(index, "currency", &sel.currency).await?;
        let description = self.description(index).await?;

        let sequence_id = index + 1;
        let Some([winner_name, small_business, jungle_region]) = self.winner(index).await? else {
            return Ok(Extraction::NoWinner {
                sequence_id,
                description,
            });
        };

        Ok(Extraction::Winner(ExtractedRecord {
            sequence_id,
            entity,
            nomenclature,
            object_type,
            description,
            value,
            currency,
            winner_name,
            small_business,
            jungle_region,
        }))
    }

    async fn read(&self, index: usize, field: &'static str, by: &By) -> Result<String, ScraperError> {
        let element = self
            .doc
            .find_one(by)
            .await
            .map_err(|e| ScraperError::extraction(index, field, e))?;
        let text = self
            .doc
            .text(&element)
            .await
            .map_err(|e| ScraperError::extraction(index, field, e))?;
        Ok(text.trim().to_string())
    }

    /// Expands the itemized listing (collapsed by default) and reads the first item.
    async fn description(&self, index: usize) -> Result<String, ScraperError> {
        let sel = &self.config.selectors;
        let err = |e: DriverError| ScraperError::extraction(index, "description", e);

        let legends = self.doc.find_all(&sel.legend).await.map_err(err)?;
        let mut expanded = false;
        for legend in &legends {
            let caption = self.doc.text(legend).await.map_err(err)?;
            if caption.contains(&sel.listing_caption) {
                self.doc.click(legend).await.map_err(err)?;
                expanded = true;
                break;
            }
        }
        if !expanded {
            warn!("No se encontró la sección {:?} en el registro {}", sel.listing_caption, index);
        }
        settle(self.config.timeouts.listing_settle).await;

        let items = self.doc.find_one(&sel.items_content).await.map_err(err)?;
        let spans = self.doc.find_within(&items, &By::tag("span")).await.map_err(err)?;
        let first = spans
            .first()
            .ok_or_else(|| ScraperError::extraction(index, "description", "el listado de ítems está vacío"))?;

        Ok(self.doc.text(first).await.map_err(err)?.trim().to_string())
    }

    /// Winner name, MYPE flag and jungle flag; `None` when the table only
    /// holds the single "no data" cell.
    async fn winner(&self, index: usize) -> Result<Option<[String; 3]>, ScraperError> {
        let err = |e: DriverError| ScraperError::extraction(index, "winner", e);

        let table = self
            .doc
            .find_one(&self.config.selectors.winner_table)
            .await
            .map_err(err)?;
        let cells = self.doc.find_within(&table, &By::tag("td")).await.map_err(err)?;
        debug!("La tabla de ganador del registro {} tiene {} celdas", index, cells.len());

        match cells.len() {
            0 => Err(ScraperError::extraction(index, "winner", "la tabla de ganador no tiene celdas")),
            1 => Ok(None),
            n if n < 3 => Err(ScraperError::extraction(
                index,
                "winner",
                format!("la tabla de ganador tiene {} celdas, se esperaban 3", n),
            )),
            _ => {
                let mut texts = Vec::with_capacity(3);
                for cell in &cells[..3] {
                    texts.push(self.doc.text(cell).await.map_err(err)?.trim().to_string());
                }
                let [name, mype, jungle]: [String; 3] = texts
                    .try_into()
                    .map_err(|_| ScraperError::extraction(index, "winner", "fila de ganador incompleta"))?;
                Ok(Some([name, mype, jungle]))
            }
        }
    }
}
