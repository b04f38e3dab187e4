//! Fixtures shared by unit tests across modules.

use crate::types::measurement::{Measurement, MeasurementFrame};
use crate::types::station::Station;
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use std::net::SocketAddr;

/// A trimmed day file in the published layout (BOM, `;` separator, extra columns).
pub const DAY_FILE: &str = "\u{feff}Date de début;Date de fin;Organisme;code zas;Zas;code site;nom site;type d'implantation;Polluant;type d'influence;valeur;valeur brute;unité de mesure;taux de saisie;validité\n\
2021/01/03 00:00:00;2021/01/03 01:00:00;ATMO AURA;FR84ZAG02;ZAG LYON;FR20047;Lyon Périphérique;Urbaine;PM10;Trafic;10;10.2;µg-m3;100;1\n\
2021/01/03 01:00:00;2021/01/03 02:00:00;ATMO AURA;FR84ZAG02;ZAG LYON;FR20047;Lyon Périphérique;Urbaine;PM10;Trafic;20;19.8;µg-m3;100;1\n\
2021/01/03 00:00:00;2021/01/03 01:00:00;ATMO AURA;FR84ZAG02;ZAG LYON;FR20047;Lyon Périphérique;Urbaine;NO2;Trafic;;;µg-m3;0;-1\n";

pub fn hour(h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 3)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

/// One hourly reading starting at `h` o'clock on 2021-01-03.
pub fn reading(
    code: &str,
    name: &str,
    pollutant: &str,
    h: u32,
    value: Option<f64>,
) -> Measurement {
    Measurement {
        start_time: Some(hour(h)),
        end_time: Some(hour(h + 1)),
        station_code: code.to_string(),
        station_name: name.to_string(),
        pollutant: pollutant.to_string(),
        value,
        raw_value: value,
        unit: Some("µg-m3".to_string()),
        validity_flag: Some(1),
    }
}

pub fn frame(records: &[Measurement]) -> MeasurementFrame {
    MeasurementFrame::from_records(records).unwrap()
}

pub fn station(code: &str, name: &str, latitude: f64, longitude: f64) -> Station {
    Station {
        station_code: code.to_string(),
        station_name: name.to_string(),
        latitude,
        longitude,
    }
}

/// Three stations, three pollutants (appearing in the order PM10, NO2, O3).
pub fn sample_records() -> Vec<Measurement> {
    vec![
        reading("FR20047", "Lyon Périphérique", "PM10", 0, Some(10.0)),
        reading("FR20047", "Lyon Périphérique", "NO2", 0, Some(40.0)),
        reading("FR04143", "Paris 18ème", "PM10", 0, Some(30.0)),
        reading("FR20047", "Lyon Périphérique", "PM10", 1, Some(20.0)),
        reading("FR04143", "Paris 18ème", "O3", 1, Some(50.0)),
        reading("FR20047", "Lyon Périphérique", "PM10", 2, Some(30.0)),
        reading("FR04143", "Paris 18ème", "NO2", 2, None),
        reading("FR99001", "Station sans registre", "PM10", 0, Some(5.0)),
    ]
}

pub fn sample_stations() -> Vec<Station> {
    vec![
        station("FR20047", "Lyon Périphérique", 45.76, 4.85),
        station("FR04143", "Paris 18ème", 48.89, 2.35),
        station("FR31002", "Station sans mesure", 43.6, 1.44),
    ]
}

/// Serves `router` on an ephemeral local port for the duration of the test runtime.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    addr
}
