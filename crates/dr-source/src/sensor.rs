use dr_core::frame::DepthUnitScale;
use dr_core::traits::SensorInfo;

use crate::error::SourceError;

/// Nombre de mètres représentés par un tick de profondeur.
///
/// Le premier capteur capable de profondeur l'emporte. S'il n'expose pas
/// l'option "depth units", on retombe sur le millimètre.
///
/// # Errors
/// [`SourceError::NoDepthSensor`] si aucun capteur n'est capable de profondeur,
/// [`SourceError::InvalidDepthUnits`] si l'unité rapportée est inutilisable.
///
/// # Example
/// ```
/// use dr_core::traits::SensorInfo;
/// use dr_source::sensor::depth_unit_scale;
///
/// let sensors = [SensorInfo::other("RGB Camera"), SensorInfo::depth("Stereo Module", Some(0.0001))];
/// let scale = depth_unit_scale(&sensors).unwrap();
/// assert!((scale.meters_per_tick() - 0.0001).abs() < f32::EPSILON);
/// ```
pub fn depth_unit_scale(sensors: &[SensorInfo]) -> Result<DepthUnitScale, SourceError> {
    let Some(sensor) = sensors.iter().find(|s| s.depth_capable) else {
        let names: Vec<&str> = sensors.iter().map(|s| s.name.as_str()).collect();
        return Err(SourceError::NoDepthSensor(format!(
            "capteurs disponibles : [{}]",
            names.join(", ")
        )));
    };

    match sensor.depth_units {
        Some(value) => {
            DepthUnitScale::new(value).map_err(|_| SourceError::InvalidDepthUnits {
                sensor: sensor.name.clone(),
                value,
            })
        }
        None => {
            log::debug!(
                "{} n'expose pas d'unité de profondeur, défaut 1 mm",
                sensor.name
            );
            Ok(DepthUnitScale::MILLIMETER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_depth_sensor_wins() {
        let sensors = [
            SensorInfo::depth("A", Some(0.002)),
            SensorInfo::depth("B", Some(0.005)),
        ];
        let scale = depth_unit_scale(&sensors).unwrap();
        assert!((scale.meters_per_tick() - 0.002).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_option_defaults_to_millimeters() {
        let sensors = [SensorInfo::depth("Recorded", None)];
        assert_eq!(
            depth_unit_scale(&sensors).unwrap(),
            DepthUnitScale::MILLIMETER
        );
    }

    #[test]
    fn no_depth_sensor_is_an_error() {
        let sensors = [SensorInfo::other("RGB Camera"), SensorInfo::other("Motion Module")];
        let err = depth_unit_scale(&sensors).unwrap_err();
        assert!(matches!(err, SourceError::NoDepthSensor(ref msg) if msg.contains("Motion Module")));
        assert!(matches!(
            depth_unit_scale(&[]),
            Err(SourceError::NoDepthSensor(_))
        ));
    }

    #[test]
    fn zero_depth_units_are_rejected() {
        let sensors = [SensorInfo::depth("Broken", Some(0.0))];
        assert!(matches!(
            depth_unit_scale(&sensors),
            Err(SourceError::InvalidDepthUnits { .. })
        ));
    }
}
