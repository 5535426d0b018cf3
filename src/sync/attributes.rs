//! Attribute updates and the growth rendezvous.
//!
//! An update that fits into the current element count is written in place.
//! An update that needs more room is staged on its buffer; the geometry is
//! only rebuilt once every buffer of the same rate has staged a replacement of
//! that very length, so the renderer never sees buffers of different lengths.

use log::debug;

use crate::{
    data_structures::geometry::{AttributeRate, BufferAttribute, Geometry},
    error::SyncError,
    resources::RenderBackend,
};

/// What an attribute update did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeOutcome {
    /// Written into the existing buffer.
    InPlace,
    /// Staged; other buffers of the set have not reported the new length yet.
    Staged,
    /// The last missing buffer arrived and the geometry was replaced.
    Rebuilt,
}

/// Per-plot bookkeeping of which attributes exist at which rate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBuffers {
    vertex: Vec<String>,
    instance: Vec<String>,
    vertex_count: usize,
    instance_count: usize,
    staged_vertex: Option<usize>,
    staged_instance: Option<usize>,
    rebuilds: usize,
}

impl AttributeBuffers {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut buffers = Self::default();
        buffers.derive(geometry);
        buffers
    }

    /// Re-reads membership and counts. The first buffer of each set is the
    /// length oracle of that set.
    fn derive(&mut self, geometry: &Geometry) {
        self.vertex = geometry.names(AttributeRate::Vertex).cloned().collect();
        self.instance = geometry.names(AttributeRate::Instance).cloned().collect();
        let count = |names: &[String]| {
            names
                .first()
                .and_then(|first| geometry.attribute(first))
                .map_or(0, BufferAttribute::count)
        };
        self.vertex_count = count(&self.vertex);
        self.instance_count = count(&self.instance);
    }

    pub fn vertex_names(&self) -> &[String] {
        &self.vertex
    }

    pub fn instance_names(&self) -> &[String] {
        &self.instance
    }

    pub fn count(&self, rate: AttributeRate) -> usize {
        match rate {
            AttributeRate::Vertex => self.vertex_count,
            AttributeRate::Instance => self.instance_count,
        }
    }

    /// How many times the geometry has been replaced.
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    pub fn rate_of(&self, name: &str) -> Option<AttributeRate> {
        if self.instance.iter().any(|n| n == name) {
            Some(AttributeRate::Instance)
        } else if self.vertex.iter().any(|n| n == name) {
            Some(AttributeRate::Vertex)
        } else {
            None
        }
    }

    /// The length a set is waiting to grow to, while some of its buffers have
    /// not reported it yet.
    ///
    /// A set stays in this state for as long as the missing buffers stay
    /// silent; the geometry keeps its last consistent contents meanwhile.
    pub fn pending_growth(&self, rate: AttributeRate) -> Option<usize> {
        match rate {
            AttributeRate::Vertex => self.staged_vertex,
            AttributeRate::Instance => self.staged_instance,
        }
    }

    fn names(&self, rate: AttributeRate) -> &[String] {
        match rate {
            AttributeRate::Vertex => &self.vertex,
            AttributeRate::Instance => &self.instance,
        }
    }

    fn staged_mut(&mut self, rate: AttributeRate) -> &mut Option<usize> {
        match rate {
            AttributeRate::Vertex => &mut self.staged_vertex,
            AttributeRate::Instance => &mut self.staged_instance,
        }
    }

    /// Applies `(name, values, new_length)` to the geometry of `plot`.
    pub fn apply<B: RenderBackend>(
        &mut self,
        plot: &str,
        geometry: &mut Geometry,
        backend: &mut B,
        name: &str,
        values: Vec<f32>,
        new_length: usize,
    ) -> Result<AttributeOutcome, SyncError> {
        let rate = self.rate_of(name).ok_or_else(|| SyncError::UnknownAttribute {
            plot: plot.to_string(),
            name: name.to_string(),
        })?;
        let Some(attribute) = geometry.attributes.get_mut(name) else {
            return Err(SyncError::UnknownAttribute {
                plot: plot.to_string(),
                name: name.to_string(),
            });
        };

        if new_length <= self.count(rate) {
            if values.len() > attribute.array.len() {
                return Err(SyncError::AttributeOverflow {
                    name: name.to_string(),
                    values: values.len(),
                    length: new_length,
                    capacity: attribute.array.len(),
                });
            }
            attribute.write_prefix(&values);
            // A newer in-place write supersedes anything staged on this buffer.
            attribute.pending = None;
            if rate == AttributeRate::Instance {
                geometry.instance_count = Some(new_length);
            }
            let still_staged = self
                .names(rate)
                .iter()
                .any(|member| geometry.attribute(member).is_some_and(|a| a.pending.is_some()));
            if !still_staged {
                *self.staged_mut(rate) = None;
            }
            return Ok(AttributeOutcome::InPlace);
        }

        attribute.pending = Some(values);
        *self.staged_mut(rate) = Some(new_length);
        let complete = self.names(rate).iter().all(|member| {
            geometry
                .attribute(member)
                .and_then(BufferAttribute::pending_count)
                == Some(new_length)
        });
        if !complete {
            debug!(
                "plot {}: staged '{}' at length {}, waiting for the rest of the set",
                plot, name, new_length
            );
            return Ok(AttributeOutcome::Staged);
        }

        let mut rebuilt = Geometry::new(geometry.index.clone(), geometry.bounding_radius);
        rebuilt.instance_count = geometry.instance_count;
        for (member, attribute) in &mut geometry.attributes {
            let array = if attribute.rate == rate {
                attribute.pending.take().unwrap_or_else(|| attribute.array.clone())
            } else {
                attribute.array.clone()
            };
            let mut replacement = BufferAttribute::new(array, attribute.item_size, attribute.rate);
            if attribute.rate != rate {
                replacement.pending = attribute.pending.take();
            }
            rebuilt.set_attribute(member.clone(), replacement);
        }
        if rate == AttributeRate::Instance {
            rebuilt.instance_count = Some(new_length);
        }

        rebuilt.handle = Some(backend.create_geometry(plot, &rebuilt));
        if let Some(old) = geometry.handle.take() {
            backend.release_geometry(old);
        }
        *geometry = rebuilt;
        self.derive(geometry);
        *self.staged_mut(rate) = None;
        self.rebuilds += 1;
        debug!(
            "plot {}: rebuilt geometry for {:?} length {}",
            plot, rate, new_length
        );
        Ok(AttributeOutcome::Rebuilt)
    }
}
