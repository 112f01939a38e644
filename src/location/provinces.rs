//! Approximate province centers keyed by two-digit province code.

use crate::models::GeoPoint;

/// (province id, latitude, longitude)
const PROVINCE_CENTERS: &[(&str, f64, f64)] = &[
    ("10", 13.7563, 100.5018), // Bangkok
    ("11", 13.5990, 100.5998), // Samut Prakan
    ("12", 13.8621, 100.5144), // Nonthaburi
    ("13", 14.0208, 100.5250), // Pathum Thani
    ("14", 14.3692, 100.5877), // Ayutthaya
    ("15", 14.5896, 100.4550), // Ang Thong
    ("16", 14.7995, 100.6532), // Lopburi
    ("17", 14.8818, 100.3928), // Sing Buri
    ("18", 15.1847, 100.1256), // Chai Nat
    ("19", 14.5289, 100.9103), // Saraburi
    ("20", 13.3622, 100.9847), // Chonburi
    ("21", 12.6802, 101.2828), // Rayong
    ("22", 12.6117, 102.1038), // Chanthaburi
    ("23", 12.2436, 102.5151), // Trat
    ("24", 13.6904, 101.0779), // Chachoengsao
    ("25", 14.0460, 101.3686), // Prachin Buri
    ("26", 14.2069, 101.2130), // Nakhon Nayok
    ("27", 13.8240, 102.0640), // Sa Kaeo
    ("30", 14.9799, 102.0977), // Nakhon Ratchasima
    ("31", 14.9930, 103.1029), // Buriram
    ("32", 14.8818, 103.4936), // Surin
    ("33", 15.1186, 104.3220), // Sisaket
    ("34", 15.2441, 104.8466), // Ubon Ratchathani
    ("35", 15.7940, 104.1450), // Yasothon
    ("36", 15.8067, 102.0314), // Chaiyaphum
    ("37", 15.8650, 104.6260), // Amnat Charoen
    ("38", 17.2038, 102.4410), // Nong Bua Lam Phu
    ("40", 16.4419, 102.8359), // Khon Kaen
    ("41", 17.4138, 102.7870), // Udon Thani
    ("42", 17.4860, 101.7223), // Loei
    ("43", 17.8782, 102.7412), // Nong Khai
    ("44", 16.1851, 103.3058), // Maha Sarakham
    ("45", 16.0564, 103.6536), // Roi Et
    ("46", 16.4322, 103.5055), // Kalasin
    ("47", 17.1555, 104.1490), // Sakon Nakhon
    ("48", 17.4074, 104.7686), // Nakhon Phanom
    ("49", 16.5426, 104.7235), // Mukdahan
    ("50", 18.7904, 98.9847), // Chiang Mai
    ("51", 18.5742, 99.0079), // Lamphun
    ("52", 18.2932, 99.4936), // Lampang
    ("53", 17.6200, 100.0994), // Uttaradit
    ("54", 18.1459, 100.1410), // Phrae
    ("55", 18.7756, 100.7730), // Nan
    ("56", 19.1717, 99.8954), // Phayao
    ("57", 19.9105, 99.8406), // Chiang Rai
    ("58", 19.2952, 97.9647), // Mae Hong Son
    ("60", 15.7047, 100.1372), // Nakhon Sawan
    ("61", 15.3791, 99.4160), // Uthai Thani
    ("62", 16.4827, 99.5226), // Kamphaeng Phet
    ("63", 16.8697, 99.1260), // Tak
    ("64", 17.0077, 99.8236), // Sukhothai
    ("65", 16.8211, 100.2659), // Phitsanulok
    ("66", 16.4381, 100.3500), // Phichit
    ("67", 16.4194, 101.1590), // Phetchabun
    ("70", 13.5282, 99.8135), // Ratchaburi
    ("71", 14.0227, 99.5452), // Kanchanaburi
    ("72", 14.4745, 100.1212), // Suphanburi
    ("73", 13.8199, 100.0440), // Nakhon Pathom
    ("74", 13.5477, 100.2745), // Samut Sakhon
    ("75", 13.4140, 100.0021), // Samut Songkhram
    ("76", 13.1117, 99.9388), // Phetchaburi
    ("77", 11.8130, 99.7970), // Prachuap Khiri Khan
    ("80", 8.4304, 99.9631), // Nakhon Si Thammarat
    ("81", 8.0863, 98.9063), // Krabi
    ("82", 8.4504, 98.5309), // Phang Nga
    ("83", 7.8804, 98.3923), // Phuket
    ("84", 9.1382, 99.3215), // Surat Thani
    ("85", 9.9539, 98.6359), // Ranong
    ("86", 10.4930, 99.1802), // Chumphon
    ("90", 7.0084, 100.4747), // Songkhla
    ("91", 6.6238, 100.0673), // Satun
    ("92", 7.5563, 99.6210), // Trang
    ("93", 7.6166, 100.0744), // Phatthalung
    ("94", 6.8693, 101.2502), // Pattani
    ("95", 6.5398, 101.2800), // Yala
    ("96", 6.4254, 101.8253), // Narathiwat
];

/// Look up the reference center for a province code.
pub fn province_center(province_id: &str) -> Option<GeoPoint> {
    PROVINCE_CENTERS
        .iter()
        .find(|(id, _, _)| *id == province_id)
        .map(|(_, lat, lng)| GeoPoint::new(*lat, *lng))
}
