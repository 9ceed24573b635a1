//! Stock substitutions for common rules phrasing.

pub(super) const ENTRIES: &[(&str, &str)] = &[
    ("Any phase", "Любая фаза"),
    ("Either player's turn", "Ход любого игрока"),
    ("Your turn", "Ваш ход"),
    ("Your ", "В вашу "),
    ("Opponent's turn", "Ход противника"),
    ("just after", "сразу после того как"),
    ("just before", "непосредственно перед"),
    ("Command phase", "фазу команд"),
    ("Movement phase", "фазу движения"),
    ("Shooting phase", "фазу стрельбы"),
    ("Charge phase", "фазу атаки"),
    ("Fight phase", "фазу боя"),
    ("Hit roll", "бросок попадания"),
    ("Wound roll", "бросок ранения"),
    ("Damage roll", "бросок урона"),
    ("saving throw", "спасбросок"),
    ("Advance roll", "бросок движения"),
    ("Charge roll", "бросок атаки"),
    ("Battle-shock test", "тест боевого шока"),
    ("Hazardous test", "тест опасности"),
    ("Desperate Escape test", "тест отчаянного побега"),
    ("re-roll", "перебросить"),
    ("Normal move", "обычное движение"),
    ("Advance move", "ускоренное движение"),
    ("Fall Back", "отступление"),
    ("mortal wound", "смертельная рана"),
    ("Engagement Range", "дистанция ближнего боя"),
    ("visible", "видимые"),
    ("Strategic Reserves", "стратегический резерв"),
    ("Pile-in", "сближение"),
    ("Consolidation move", "консолидация"),
    ("declare a charge", "объявить атаку"),
    ("invulnerable save", "неуязвимый спасбросок"),
    ("Benefit of Cover", "преимущество укрытия"),
    ("One unit from your army", "Одно подразделение из вашей армии"),
    ("One model in your unit", "Одну модель в вашем подразделении"),
    ("That unit from your army", "Это подразделение из вашей армии"),
    ("That unit or model from your army", "Это подразделение или модель из вашей армии"),
    ("Leader", "лидер"),
    ("Bodyguard", "телохранитель"),
    ("CHARACTER", "ПЕРСОНАЖ"),
    ("INFANTRY", "ПЕХОТА"),
    ("VEHICLE", "ТЕХНИКА"),
    ("MONSTER", "МОНСТР"),
    ("WALKER", "ШАГАЮЩАЯ МАШИНА"),
    ("[BLAST]", "[ВЗРЫВ]"),
    ("[HAZARDOUS]", "[ОПАСНОЕ]"),
    ("[LETHAL HITS]", "[СМЕРТОНОСНЫЕ ПОПАДАНИЯ]"),
    ("[SUSTAINED HITS 1]", "[НЕПРЕРЫВНЫЕ ПОПАДАНИЯ 1]"),
    ("[PRECISION]", "[ТОЧНОСТЬ]"),
    ("Until the end of the phase", "До конца фазы"),
    ("Until the end of the turn", "До конца хода"),
    ("Until the start of your next", "До начала следующего"),
    ("Start of", "Начало"),
    ("End of", "Конец"),
    ("that has not been selected", "которое не было выбрано"),
    ("that was selected as the target", "которое было выбрано целью"),
    ("within 6\"", "в пределах 6\""),
    ("within Engagement Range", "в дистанции ближнего боя"),
    ("is equipped with a weapon", "экипировано оружием"),
    ("to shoot this phase", "для стрельбы в эту фазу"),
    ("to fight this phase", "для боя в эту фазу"),
    ("You cannot use this Stratagem more than once per battle", "Вы не можете использовать эту стратагему более одного раза за битву"),
    ("attacking model", "атакующая модель"),
    ("target unit", "целевое подразделение"),
    ("enemy unit", "вражеское подразделение"),
    ("friendly unit", "дружественное подразделение"),
    ("attacks made with that weapon", "атаки совершённые этим оружием"),
    ("can be allocated to models", "могут быть назначены моделям"),
    ("models that are not", "модели которые не"),
    ("for the purpose of that ability", "для цели этой способности"),
    ("when determining how many models", "при определении количества моделей"),
    ("include models", "включать модели"),
    ("are in the target unit", "находятся в целевом подразделении"),
    ("Select one model", "Выберите одну модель"),
    ("In addition", "Кроме того"),
    ("You re-roll", "Вы перебрасываете"),
    ("that roll, test or saving throw", "этот бросок, тест или спасбросок"),
    ("for an attack, model or unit from your army", "для атаки, модели или подразделения из вашей армии"),
    ("to determine the number of attacks made with a weapon", "чтобы определить количество атак оружием"),
    ("you have rolled the dice", "вы бросили кости"),
    ("you have made a", "вы совершили"),
    ("or just after", "или сразу после"),
];
