use chrono::{Datelike, Local};

use crate::budget;
use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::ingestor;
use crate::settings::get_data_dir;
use crate::store::{self, NewRule};

struct DemoRule {
    keywords: &'static str,
    classification: &'static str,
    main_category: &'static str,
    sub_category: &'static str,
    limit: Option<f64>,
}

const RULES: &[DemoRule] = &[
    DemoRule { keywords: "النهدي,Al Nahdi,الدواء,Al Dawaa", classification: "Necessities", main_category: "Health", sub_category: "Pharmacy", limit: Some(400.0) },
    DemoRule { keywords: "بنده,Panda,التميمي,Tamimi,الدانوب,Danube", classification: "Necessities", main_category: "Groceries", sub_category: "Supermarket", limit: Some(2000.0) },
    DemoRule { keywords: "STC,موبايلي,Mobily,زين,Zain", classification: "Necessities", main_category: "Utilities", sub_category: "Telecom", limit: Some(300.0) },
    DemoRule { keywords: "أوبر,Uber,كريم,Careem", classification: "Necessities", main_category: "Transport", sub_category: "Ride Hailing", limit: Some(500.0) },
    DemoRule { keywords: "أرامكو,Aramco,SASCO,بترومين", classification: "Necessities", main_category: "Transport", sub_category: "Fuel", limit: Some(600.0) },
    DemoRule { keywords: "هنقرستيشن,HungerStation,جاهز,Jahez,مرسول", classification: "Luxuries", main_category: "Dining", sub_category: "Delivery", limit: Some(700.0) },
    DemoRule { keywords: "ستاربكس,Starbucks,دانكن,Dunkin", classification: "Luxuries", main_category: "Dining", sub_category: "Coffee", limit: Some(250.0) },
    DemoRule { keywords: "أمازون,Amazon,نون,Noon", classification: "Luxuries", main_category: "Shopping", sub_category: "Online", limit: Some(800.0) },
    DemoRule { keywords: "جرير,Jarir,اكسترا,eXtra", classification: "Luxuries", main_category: "Shopping", sub_category: "Electronics", limit: Some(1000.0) },
];

struct DemoSms {
    day: u32,
    amount: &'static str,
    merchant: &'static str,
}

const MESSAGES: &[DemoSms] = &[
    DemoSms { day: 1, amount: "54.30", merchant: "بنده" },
    DemoSms { day: 2, amount: "23.00", merchant: "ستاربكس" },
    DemoSms { day: 2, amount: "89.70", merchant: "صيدلية النهدي" },
    DemoSms { day: 3, amount: "120.00", merchant: "محطة أرامكو" },
    DemoSms { day: 4, amount: "36.80", merchant: "كريم" },
    DemoSms { day: 5, amount: "230.00", merchant: "STC" },
    DemoSms { day: 6, amount: "312.45", merchant: "أسواق التميمي" },
    DemoSms { day: 7, amount: "78.00", merchant: "هنقرستيشن" },
    DemoSms { day: 8, amount: "18.50", merchant: "أوبر" },
    DemoSms { day: 9, amount: "449.00", merchant: "مكتبة جرير" },
    DemoSms { day: 10, amount: "62.25", merchant: "جاهز" },
    DemoSms { day: 11, amount: "27.00", merchant: "دانكن" },
    DemoSms { day: 12, amount: "158.90", merchant: "نون" },
    DemoSms { day: 13, amount: "41.35", merchant: "الدانوب" },
    DemoSms { day: 14, amount: "95.00", merchant: "SASCO" },
    DemoSms { day: 15, amount: "210.60", merchant: "أمازون" },
    DemoSms { day: 16, amount: "33.40", merchant: "Al Nahdi" },
    DemoSms { day: 18, amount: "76.10", merchant: "بنده" },
    DemoSms { day: 19, amount: "450.00", merchant: "مطعم البيك" },
    DemoSms { day: 20, amount: "52.00", merchant: "HungerStation" },
    DemoSms { day: 22, amount: "19.90", merchant: "Careem" },
    DemoSms { day: 24, amount: "140.00", merchant: "Mobily" },
    DemoSms { day: 26, amount: "385.20", merchant: "eXtra" },
    DemoSms { day: 27, amount: "64.75", merchant: "مرسول" },
    DemoSms { day: 28, amount: "88.00", merchant: "Panda" },
];

/// Messages that should land as failed extractions.
const NOISE: &[(u32, &str)] = &[
    (3, "رمز التحقق الخاص بك هو 482913"),
    (21, "عزيزي العميل، تم تحديث بيانات حسابك بنجاح"),
];

pub fn run() -> Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let mut conn = get_connection(&data_dir.join("masroof.db"))?;
    init_db(&conn)?;

    if store::list_rules(&conn)?.is_empty() {
        for rule in RULES {
            store::insert_rule(
                &conn,
                &NewRule {
                    merchant_keywords: rule.keywords,
                    classification: rule.classification,
                    main_category: rule.main_category,
                    sub_category: rule.sub_category,
                    category_limit: rule.limit,
                },
            )?;
        }
    }

    let today = Local::now().date_naive();
    let first_of_month = format!("{:04}-{:02}-01", today.year(), today.month());
    let cycle = budget::start_new_cycle(&mut conn, &first_of_month)?;

    let now = store::timestamp_now();
    let stamp_for = |day: u32| {
        // Messages dated after today land at the current instant instead
        let day = day.min(today.day());
        let hour = 9 + day % 12;
        let stamp = format!(
            "{:04}-{:02}-{:02} {:02}:15:00",
            today.year(),
            today.month(),
            day,
            hour
        );
        if stamp > now {
            now.clone()
        } else {
            stamp
        }
    };

    let mut recorded = 0usize;
    for msg in MESSAGES {
        let sms = format!(
            "شراء عبر نقطة البيع\nمبلغ: {} SAR\nلدى: {}",
            msg.amount, msg.merchant
        );
        ingestor::ingest_sms(&conn, &sms, Some(&stamp_for(msg.day)))?;
        recorded += 1;
    }
    for (day, text) in NOISE {
        ingestor::ingest_sms(&conn, text, Some(&stamp_for(*day)))?;
        recorded += 1;
    }

    println!(
        "Demo data loaded: {} rules, {recorded} messages, cycle {} started {first_of_month}",
        RULES.len(),
        cycle.id
    );
    println!("Try: masroof cycle analysis {}", cycle.id);
    println!("     masroof category remaining Groceries");
    println!("     masroof invoices list");
    Ok(())
}
