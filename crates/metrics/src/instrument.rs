//! Handle plumbing shared by the four instrument kinds.

use crate::descriptor::{InstrumentKind, MetricDescriptor};
use crate::labels::{LabelKey, LabelValue};
use crate::registry::RegisteredInstrument;
use openconsensus_common::{Clock, Resource};
use std::sync::Arc;

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// An instrument handle the registry knows how to build.
///
/// Implemented by [`crate::GaugeLong`], [`crate::GaugeDouble`],
/// [`crate::CounterLong`], and [`crate::CounterDouble`] only.
pub trait Instrument: sealed::Sealed + Clone + Send + Sync + 'static {
    /// Kind recorded in the registry for this handle type.
    const KIND: InstrumentKind;

    #[doc(hidden)]
    fn construct(
        descriptor: MetricDescriptor,
        constant_labels: Vec<(LabelKey, LabelValue)>,
        resource: Arc<Resource>,
        clock: Arc<dyn Clock>,
    ) -> Self;

    #[doc(hidden)]
    fn registered(&self) -> RegisteredInstrument;
}

/// Define an instrument handle over a [`crate::series::SeriesStore`].
///
/// Every handle is a cheap `Arc` clone of its store and exposes the same
/// series management surface; only the point type differs. The handle name
/// doubles as the [`InstrumentKind`] and [`RegisteredInstrument`] variant.
macro_rules! instrument_handle {
    (
        $(#[$meta:meta])*
        $handle:ident, $cell:ty, $point:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $handle {
            store: std::sync::Arc<$crate::series::SeriesStore<$cell>>,
        }

        impl $handle {
            /// Descriptor fixed at build time.
            #[must_use]
            pub fn descriptor(&self) -> &$crate::descriptor::MetricDescriptor {
                self.store.descriptor()
            }

            /// Return the series for `label_values`, creating it on first use.
            ///
            /// `label_values` must line up with the descriptor's label keys.
            pub fn get_or_create_time_series(
                &self,
                label_values: &[$crate::labels::LabelValue],
            ) -> Result<$point, $crate::error::MetricError> {
                self.store
                    .get_or_create(label_values)
                    .map(|cell| $point { cell })
            }

            /// The series whose label values are all unset.
            #[must_use]
            pub fn default_time_series(&self) -> $point {
                $point {
                    cell: self.store.default_series(),
                }
            }

            /// Drop the series for `label_values`; a no-op when it does not exist.
            pub fn remove_time_series(
                &self,
                label_values: &[$crate::labels::LabelValue],
            ) -> Result<(), $crate::error::MetricError> {
                self.store.remove(label_values)
            }

            /// Drop every series.
            pub fn clear(&self) {
                self.store.clear();
            }

            /// Number of live series.
            #[must_use]
            pub fn time_series_count(&self) -> usize {
                self.store.len()
            }

            pub(crate) fn snapshot(&self) -> $crate::snapshot::Metric {
                self.store.snapshot()
            }
        }

        impl $crate::instrument::sealed::Sealed for $handle {}

        impl $crate::instrument::Instrument for $handle {
            const KIND: $crate::descriptor::InstrumentKind =
                $crate::descriptor::InstrumentKind::$handle;

            fn construct(
                descriptor: $crate::descriptor::MetricDescriptor,
                constant_labels: Vec<($crate::labels::LabelKey, $crate::labels::LabelValue)>,
                resource: std::sync::Arc<openconsensus_common::Resource>,
                clock: std::sync::Arc<dyn openconsensus_common::Clock>,
            ) -> Self {
                Self {
                    store: std::sync::Arc::new($crate::series::SeriesStore::new(
                        descriptor,
                        constant_labels,
                        resource,
                        clock,
                    )),
                }
            }

            fn registered(&self) -> $crate::registry::RegisteredInstrument {
                $crate::registry::RegisteredInstrument::$handle(self.clone())
            }
        }
    };
}

pub(crate) use instrument_handle;
